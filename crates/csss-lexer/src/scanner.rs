use crate::token::{Span, Token, TokenKind};
use crate::LexError;

/// CSSS source scanner.
///
/// Single left-to-right pass with one character of lookahead and no
/// backtracking. Positions are tracked as both a char index (for
/// navigation) and a byte offset (for spans and errors).
///
/// Error offsets are measured from the first non-whitespace byte, so they
/// index into the trimmed source. Lines, columns and spans stay relative to
/// the full input.
pub struct Scanner<'a> {
    source: &'a str,
    /// Bytes of leading whitespace.
    leading: usize,
    chars: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            leading: source.len() - source.trim_start().len(),
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        log::debug!(
            "lexed {} bytes into {} tokens",
            source.len(),
            scanner.tokens.len()
        );
        Ok(scanner.tokens)
    }

    fn scan_tokens(&mut self) -> Result<(), LexError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }
        Ok(())
    }

    /// Scan the next token, or skip whitespace / a comment.
    fn scan_token(&mut self) -> Result<(), LexError> {
        let ch = self.peek();

        match ch {
            c if c.is_whitespace() => {
                self.advance();
                Ok(())
            }

            '/' if self.peek_next() == '*' => self.skip_comment(),

            '"' => self.scan_string(),

            '0'..='9' => {
                self.scan_while(TokenKind::Number, |c| c.is_ascii_digit());
                Ok(())
            }

            c if c.is_ascii_alphabetic() => {
                self.scan_while(TokenKind::Identifier, |c| {
                    c.is_ascii_alphanumeric() || c == '-'
                });
                Ok(())
            }

            '&' => self.single(TokenKind::Ampersand),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),

            _ => Err(LexError::UnexpectedCharacter {
                ch,
                offset: self.error_offset(self.offset),
                line: self.line,
                column: self.column,
            }),
        }
    }

    // --- Scanners ---

    /// Emit a one-character punctuation token.
    fn single(&mut self, kind: TokenKind) -> Result<(), LexError> {
        let (start, line, column) = self.mark();
        self.advance();
        self.push(kind, start, line, column);
        Ok(())
    }

    /// Emit a token for the maximal run of characters accepted by `accept`.
    /// The first character has already been classified by the caller.
    fn scan_while(&mut self, kind: TokenKind, accept: impl Fn(char) -> bool) {
        let (start, line, column) = self.mark();
        self.advance();
        while !self.is_at_end() && accept(self.peek()) {
            self.advance();
        }
        self.push(kind, start, line, column);
    }

    /// Scan a string literal. Content is taken verbatim, there are no escapes.
    fn scan_string(&mut self) -> Result<(), LexError> {
        let (start, line, column) = self.mark();
        self.advance(); // opening quote
        let content_start = self.offset;

        while !self.is_at_end() && self.peek() != '"' {
            self.advance();
        }

        if self.is_at_end() {
            return Err(LexError::UnterminatedString {
                offset: self.error_offset(start),
                line,
                column,
            });
        }

        let source = self.source;
        let content = &source[content_start..self.offset];
        self.advance(); // closing quote

        let span = Span::new(start, self.offset, line, column);
        self.tokens
            .push(Token::new(TokenKind::String, content, span));
        Ok(())
    }

    /// Skip a `/* ... */` comment.
    fn skip_comment(&mut self) -> Result<(), LexError> {
        let (start, line, column) = self.mark();
        self.advance();
        self.advance();

        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::UnterminatedComment {
            offset: self.error_offset(start),
            line,
            column,
        })
    }

    // --- Helpers ---

    fn error_offset(&self, offset: usize) -> usize {
        offset.saturating_sub(self.leading)
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.offset, self.line, self.column)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let source = self.source;
        let text = &source[start..self.offset];
        let span = Span::new(start, self.offset, line, column);
        log::trace!("token {kind} {text:?} at {line}:{column}");
        self.tokens.push(Token::new(kind, text, span));
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let ch = self.chars[self.pos];
        self.pos += 1;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}
