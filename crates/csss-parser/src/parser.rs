//! Recursive descent parser for CSSS.
//!
//! `loop` is not a token kind of its own. At each declaration-start
//! position an identifier is checked against the reserved-word set
//! before it is taken as a property name, so a property literally named
//! `loop` cannot be written.

use crate::ast::{Declaration, Literal, LoopBlock, Node, Program, Rule, Value};
use crate::{Expected, ParseError};
use csss_lexer::{Token, TokenKind};

/// Reserved words recognized at declaration-start positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Loop,
}

impl Keyword {
    /// Classify an identifier against the reserved-word set.
    pub fn classify(ident: &str) -> Option<Keyword> {
        match ident {
            "loop" => Some(Keyword::Loop),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Loop => "loop",
        }
    }
}

/// Deepest allowed `{ ... }` nesting, counting the rule's own block.
pub const MAX_NESTING: usize = 256;

/// CSSS parser.
///
/// Owns the token vector for the duration of one parse.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Lex and parse source code into a program AST.
    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = csss_lexer::Scanner::tokenize(source)?;
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    /// Parse the whole token stream as a program.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut rules = Vec::new();

        while self.peek().is_some() {
            rules.push(self.parse_rule()?);
        }

        log::debug!("parsed {} rules from {} tokens", rules.len(), self.tokens.len());
        Ok(Program { rules })
    }

    // =========================================================================
    // Rules and declarations
    // =========================================================================

    /// `selector { ... }`
    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let selector = self.consume(TokenKind::Identifier)?.text;
        log::trace!("rule `{selector}`");
        let declarations = self.parse_block()?;
        Ok(Rule {
            selector,
            declarations,
        })
    }

    /// `{ Declaration* }`
    fn parse_block(&mut self) -> Result<Vec<Node>, ParseError> {
        let open = self.consume(TokenKind::LBrace)?;
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                line: open.span.line,
                column: open.span.column,
            });
        }

        self.depth += 1;
        let mut body = Vec::new();
        while self
            .peek()
            .is_some_and(|t| t.kind != TokenKind::RBrace)
        {
            body.push(self.parse_declaration()?);
        }
        self.depth -= 1;

        self.consume(TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_declaration(&mut self) -> Result<Node, ParseError> {
        let keyword = self.peek().and_then(|t| match t.kind {
            TokenKind::Identifier => Keyword::classify(&t.text),
            _ => None,
        });

        if keyword == Some(Keyword::Loop) {
            self.advance();
            let body = self.parse_block()?;
            return Ok(Node::Loop(LoopBlock { body }));
        }

        if self.check(TokenKind::Ampersand) {
            self.advance();
            self.consume_keyword(Keyword::Loop)?;
            let body = self.parse_block()?;
            return Ok(Node::NestedLoop(LoopBlock { body }));
        }

        let property = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Colon)?;
        let value = self.parse_value()?;
        self.consume(TokenKind::Semicolon)?;

        Ok(Node::Declaration(Declaration {
            property: property.text,
            value,
            span: property.span,
        }))
    }

    /// `Number | String | Identifier`. Identifiers become variable references.
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = self.bump().ok_or(ParseError::UnexpectedEof {
            expected: Expected::Value,
        })?;

        match token.kind {
            TokenKind::Number => Ok(Value::Literal(Literal::Integer(canonical_digits(
                &token.text,
            )))),
            TokenKind::String => Ok(Value::Literal(Literal::String(token.text))),
            TokenKind::Identifier => Ok(Value::Variable(token.text)),
            _ => Err(unexpected(Expected::Value, token)),
        }
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Take the current token and move past it.
    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.advance();
        token
    }

    /// Consume a token of the given kind. The position advances even when
    /// the token does not match; the error ends the parse anyway.
    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let expected = Expected::Token(kind);
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(unexpected(expected, token)),
            None => Err(ParseError::UnexpectedEof { expected }),
        }
    }

    /// Consume an identifier spelling the given reserved word.
    fn consume_keyword(&mut self, keyword: Keyword) -> Result<Token, ParseError> {
        let expected = Expected::Keyword(keyword);
        match self.bump() {
            Some(token)
                if token.kind == TokenKind::Identifier && token.text == keyword.as_str() =>
            {
                Ok(token)
            }
            Some(token) => Err(unexpected(expected, token)),
            None => Err(ParseError::UnexpectedEof { expected }),
        }
    }
}

/// Strip leading zeros, keeping a lone `0`. The digits are not widened to a
/// fixed-size integer, so any run the lexer accepts is a valid literal.
fn canonical_digits(text: &str) -> String {
    let trimmed = text.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unexpected(expected: Expected, found: Token) -> ParseError {
    ParseError::Unexpected {
        expected,
        line: found.span.line,
        column: found.span.column,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csss_lexer::LexError;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        Parser::parse(source).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::parse(source).unwrap_err()
    }

    fn first_rule(program: &Program) -> &Rule {
        &program.rules[0]
    }

    fn decl(property: &str, value: Value) -> Node {
        Node::Declaration(Declaration::new(property, value))
    }

    /// Drop spans so trees can be compared structurally.
    fn strip(nodes: &[Node]) -> Vec<Node> {
        nodes
            .iter()
            .map(|node| match node {
                Node::Declaration(d) => decl(&d.property, d.value.clone()),
                Node::Loop(l) => Node::Loop(LoopBlock { body: strip(&l.body) }),
                Node::NestedLoop(l) => Node::NestedLoop(LoopBlock { body: strip(&l.body) }),
            })
            .collect()
    }

    // =========================================================================
    // Empty / simple
    // =========================================================================

    #[test]
    fn test_empty_program() {
        assert!(parse("").rules.is_empty());
    }

    #[test]
    fn test_comments_only() {
        assert!(parse("/* nothing here */").rules.is_empty());
    }

    #[test]
    fn test_empty_rule() {
        let program = parse("div {}");
        let rule = first_rule(&program);
        assert_eq!(rule.selector, "div");
        assert!(rule.declarations.is_empty());
    }

    #[test]
    fn test_multiple_rules_in_order() {
        let program = parse("a {} b-c {} d {}");
        let selectors: Vec<&str> = program.rules.iter().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, vec!["a", "b-c", "d"]);
    }

    // =========================================================================
    // Declarations and values
    // =========================================================================

    #[test]
    fn test_string_declaration() {
        let program = parse("div { say: \"hello\"; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![decl("say", Value::string("hello"))]
        );
    }

    #[test]
    fn test_number_declaration() {
        let program = parse("div { width: 007; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![decl("width", Value::integer(7))]
        );
    }

    #[test]
    fn test_identifier_value_is_variable() {
        let program = parse("div { color: red; say: color; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![
                decl("color", Value::variable("red")),
                decl("say", Value::variable("color")),
            ]
        );
    }

    #[test]
    fn test_declaration_order_preserved() {
        let program = parse("div { a: 1; b: 2; c: 3; d: 4; }");
        let props: Vec<String> = first_rule(&program)
            .declarations
            .iter()
            .map(|n| match n {
                Node::Declaration(d) => d.property.clone(),
                other => panic!("Expected Declaration, got {other:?}"),
            })
            .collect();
        assert_eq!(props, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_declaration_span() {
        let program = parse("div {\n  color: red;\n}");
        match &first_rule(&program).declarations[0] {
            Node::Declaration(d) => {
                assert_eq!(d.span.line, 2);
                assert_eq!(d.span.column, 3);
            }
            other => panic!("Expected Declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_times_outside_loop_is_plain_declaration() {
        let program = parse("div { times: 3; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![decl("times", Value::integer(3))]
        );
    }

    // =========================================================================
    // Loops
    // =========================================================================

    #[test]
    fn test_loop() {
        let program = parse("div { loop { times: 3; say: \"x\"; } }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![Node::Loop(LoopBlock {
                body: vec![
                    decl("times", Value::integer(3)),
                    decl("say", Value::string("x")),
                ],
            })]
        );
    }

    #[test]
    fn test_empty_loop() {
        let program = parse("div { loop {} }");
        assert_eq!(
            first_rule(&program).declarations,
            vec![Node::Loop(LoopBlock::default())]
        );
    }

    #[test]
    fn test_nested_loop() {
        let program = parse("div { loop { times: 2; &loop { times: 2; say: \"y\"; } } }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![Node::Loop(LoopBlock {
                body: vec![
                    decl("times", Value::integer(2)),
                    Node::NestedLoop(LoopBlock {
                        body: vec![
                            decl("times", Value::integer(2)),
                            decl("say", Value::string("y")),
                        ],
                    }),
                ],
            })]
        );
    }

    #[test]
    fn test_ampersand_with_space_before_loop() {
        let program = parse("div { & loop { say: 1; } }");
        assert!(matches!(
            first_rule(&program).declarations[0],
            Node::NestedLoop(_)
        ));
    }

    #[test]
    fn test_plain_loop_inside_loop() {
        let program = parse("div { loop { loop { say: 1; } } }");
        match &first_rule(&program).declarations[0] {
            Node::Loop(outer) => assert!(matches!(outer.body[0], Node::Loop(_))),
            other => panic!("Expected Loop, got {other:?}"),
        }
    }

    // =========================================================================
    // Keywords
    // =========================================================================

    #[test]
    fn test_keyword_classify() {
        assert_eq!(Keyword::classify("loop"), Some(Keyword::Loop));
        assert_eq!(Keyword::classify("loops"), None);
        assert_eq!(Keyword::classify("times"), None);
        assert_eq!(Keyword::classify("say"), None);
    }

    #[test]
    fn test_loop_property_is_shadowed() {
        let err = parse_err("div { loop: 3; }");
        match err {
            ParseError::Unexpected {
                expected, found, ..
            } => {
                assert_eq!(expected, Expected::Token(TokenKind::LBrace));
                assert_eq!(found.kind, TokenKind::Colon);
            }
            other => panic!("Expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn test_loop_as_selector() {
        let program = parse("loop { say: 1; }");
        assert_eq!(first_rule(&program).selector, "loop");
    }

    #[test]
    fn test_loop_as_value_is_variable() {
        let program = parse("div { a: loop; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![decl("a", Value::variable("loop"))]
        );
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_missing_closing_brace() {
        let err = parse_err("div { say: \"hi\";");
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                expected: Expected::Token(TokenKind::RBrace),
            }
        );
        assert_eq!(err.to_string(), "Parse error: expected RBrace, found end of input");
    }

    #[test]
    fn test_ampersand_without_loop() {
        let err = parse_err("div { &say: 1; }");
        match &err {
            ParseError::Unexpected {
                expected, found, ..
            } => {
                assert_eq!(*expected, Expected::Keyword(Keyword::Loop));
                assert_eq!(found.text, "say");
            }
            other => panic!("Expected Unexpected, got {other:?}"),
        }
        assert!(err.to_string().contains("expected Identifier `loop`"));
    }

    #[test]
    fn test_ampersand_followed_by_brace() {
        let err = parse_err("div { & { } }");
        assert_eq!(err.expected(), Some(Expected::Keyword(Keyword::Loop)));
    }

    #[test]
    fn test_ampersand_at_end() {
        let err = parse_err("div { &");
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                expected: Expected::Keyword(Keyword::Loop),
            }
        );
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_err("div { a: 1 b: 2; }");
        match err {
            ParseError::Unexpected {
                expected,
                found,
                line,
                column,
            } => {
                assert_eq!(expected, Expected::Token(TokenKind::Semicolon));
                assert_eq!(found.text, "b");
                assert_eq!((line, column), (1, 12));
            }
            other => panic!("Expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_err("div { a 1; }");
        assert_eq!(err.expected(), Some(Expected::Token(TokenKind::Colon)));
    }

    #[test]
    fn test_invalid_value() {
        let err = parse_err("div { a: {; }");
        assert_eq!(err.expected(), Some(Expected::Value));
        assert!(err
            .to_string()
            .contains("expected a value (Number, String or Identifier), found LBrace `{`"));
    }

    #[test]
    fn test_value_at_end() {
        let err = parse_err("div { a:");
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                expected: Expected::Value,
            }
        );
    }

    #[test]
    fn test_rule_without_selector() {
        let err = parse_err("{ a: 1; }");
        assert_eq!(err.expected(), Some(Expected::Token(TokenKind::Identifier)));
    }

    #[test]
    fn test_selector_without_block() {
        let err = parse_err("div");
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                expected: Expected::Token(TokenKind::LBrace),
            }
        );
    }

    #[test]
    fn test_stray_closing_brace() {
        let err = parse_err("div {} }");
        assert_eq!(err.expected(), Some(Expected::Token(TokenKind::Identifier)));
    }

    #[test]
    fn test_declaration_starting_with_number() {
        let err = parse_err("div { 3: x; }");
        assert_eq!(err.expected(), Some(Expected::Token(TokenKind::Identifier)));
    }

    #[test]
    fn test_number_wider_than_u64() {
        let program = parse("div { a: 99999999999999999999999; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![decl(
                "a",
                Value::Literal(Literal::Integer("99999999999999999999999".into()))
            )]
        );
    }

    #[test]
    fn test_zero_literal() {
        let program = parse("div { a: 000; }");
        assert_eq!(
            strip(&first_rule(&program).declarations),
            vec![decl("a", Value::integer(0))]
        );
    }

    // =========================================================================
    // Nesting limit
    // =========================================================================

    fn nested_loops(depth: usize) -> String {
        format!("a {{ {}{} }}", "loop { ".repeat(depth), "} ".repeat(depth))
    }

    #[test]
    fn test_nesting_at_limit() {
        let program = parse(&nested_loops(MAX_NESTING - 1));
        assert_eq!(program.rules.len(), 1);
    }

    #[test]
    fn test_nesting_past_limit() {
        let err = parse_err(&nested_loops(MAX_NESTING));
        assert!(matches!(err, ParseError::TooDeep { line: 1, .. }));
    }

    #[test]
    fn test_very_deep_nesting_is_an_error() {
        let err = parse_err(&nested_loops(10_000));
        assert!(matches!(err, ParseError::TooDeep { .. }));
        assert!(err.to_string().contains("nested deeper than 256"));
    }

    #[test]
    fn test_lex_error_passes_through() {
        let err = parse_err("div { a: #fff; }");
        assert_eq!(
            err,
            ParseError::Lex(LexError::UnexpectedCharacter {
                ch: '#',
                offset: 9,
                line: 1,
                column: 10,
            })
        );
        assert_eq!(err.expected(), None);
    }

    #[test]
    fn test_parse_from_tokens() {
        let tokens = csss_lexer::Scanner::tokenize("p { say: 1; }").unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        assert_eq!(program.rules.len(), 1);
    }
}
