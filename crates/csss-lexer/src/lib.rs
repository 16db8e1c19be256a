//! CSSS Lexer
//!
//! Tokenizes `.csss` source into a flat stream of tokens: identifiers
//! (hyphens allowed), unsigned integers, double-quoted strings, and the
//! punctuation `&` `{` `}` `:` `;`. Whitespace and `/* ... */` comments
//! are skipped.
//!
//! # Example
//!
//! ```
//! use csss_lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("div { say: \"hi\"; }").unwrap();
//! assert_eq!(tokens.len(), 7);
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// Lexer error with position information.
///
/// `offset` is the byte offset into the source with leading whitespace
/// trimmed. `line` and `column` count from the start of the untrimmed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Lexer error at line {line}, column {column}: unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter {
        ch: char,
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("Lexer error at line {line}, column {column}: unterminated string starting at offset {offset}")]
    UnterminatedString {
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("Lexer error at line {line}, column {column}: unterminated comment starting at offset {offset}")]
    UnterminatedComment {
        offset: usize,
        line: usize,
        column: usize,
    },
}

impl LexError {
    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { offset, .. }
            | LexError::UnterminatedString { offset, .. }
            | LexError::UnterminatedComment { offset, .. } => *offset,
        }
    }
}
