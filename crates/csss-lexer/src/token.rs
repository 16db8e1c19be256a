use std::fmt;

use serde::Serialize;

/// A region of source text. `start`/`end` are byte offsets, `line`/`column`
/// are 1-based and point at the first character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification for CSSS source.
///
/// Keywords are not distinguished here: `loop` lexes as an `Identifier`
/// and the parser decides what it means by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Ampersand, // &loop
    LBrace,
    RBrace,
    Colon,
    Semicolon,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "Identifier",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
            TokenKind::Ampersand => "Ampersand",
            TokenKind::LBrace => "LBrace",
            TokenKind::RBrace => "RBrace",
            TokenKind::Colon => "Colon",
            TokenKind::Semicolon => "Semicolon",
        };
        f.write_str(name)
    }
}

/// A token produced by the CSSS lexer.
///
/// `text` is the raw lexeme: string tokens hold the content between the
/// quotes, number tokens hold the digit run as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "{} \"{}\"", self.kind, self.text),
            _ => write!(f, "{} `{}`", self.kind, self.text),
        }
    }
}
