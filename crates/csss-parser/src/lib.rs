//! CSSS Parser
//!
//! Parses a token stream from `csss-lexer` into a [`Program`] AST using
//! recursive descent with one token of lookahead.
//!
//! ```text
//! Program     := Rule*
//! Rule        := Identifier '{' Declaration* '}'
//! Declaration := 'loop' '{' Declaration* '}'
//!              | '&' 'loop' '{' Declaration* '}'
//!              | Identifier ':' Value ';'
//! Value       := Number | String | Identifier
//! ```
//!
//! The first error aborts the parse; there is no recovery.

pub mod ast;
pub mod parser;

use std::fmt;

use csss_lexer::{LexError, Token, TokenKind};

pub use ast::{Declaration, Literal, LoopBlock, Node, Program, Rule, Value};
pub use parser::{Keyword, Parser, MAX_NESTING};

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A token of this kind, any text.
    Token(TokenKind),
    /// An identifier spelling this reserved word.
    Keyword(Keyword),
    /// A declaration value.
    Value,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{kind}"),
            Expected::Keyword(kw) => write!(f, "{} `{}`", TokenKind::Identifier, kw.as_str()),
            Expected::Value => f.write_str("a value (Number, String or Identifier)"),
        }
    }
}

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Parse error at line {line}, column {column}: expected {expected}, found {found}")]
    Unexpected {
        expected: Expected,
        found: Token,
        line: usize,
        column: usize,
    },

    #[error("Parse error: expected {expected}, found end of input")]
    UnexpectedEof { expected: Expected },

    #[error("Parse error at line {line}, column {column}: blocks nested deeper than {max}", max = parser::MAX_NESTING)]
    TooDeep { line: usize, column: usize },

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// The expectation that failed, for token mismatch errors.
    pub fn expected(&self) -> Option<Expected> {
        match self {
            ParseError::Unexpected { expected, .. } | ParseError::UnexpectedEof { expected } => {
                Some(*expected)
            }
            _ => None,
        }
    }
}
