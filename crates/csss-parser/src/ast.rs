//! Abstract Syntax Tree for CSSS.
//!
//! The tree is built once by the parser and only read afterwards.

use csss_lexer::Span;
use serde::Serialize;

/// A complete compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    pub rules: Vec<Rule>,
}

/// A top-level `selector { ... }` block.
///
/// The selector has no meaning at run time; it only groups declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Node>,
}

/// An item inside a rule or loop body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Node {
    /// `property: value;`
    Declaration(Declaration),

    /// `loop { ... }`
    Loop(LoopBlock),

    /// `&loop { ... }`
    NestedLoop(LoopBlock),
}

/// A `property: value;` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub property: String,
    pub value: Value,
    pub span: Span,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: Value) -> Self {
        Self {
            property: property.into(),
            value,
            span: Span::default(),
        }
    }
}

/// The body of a `loop` or `&loop` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopBlock {
    pub body: Vec<Node>,
}

/// The right-hand side of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    Literal(Literal),

    /// A bare identifier. Not checked against earlier declarations.
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    /// Unsigned decimal digits, leading zeros removed.
    Integer(String),
    String(String),
}

impl Value {
    pub fn integer(n: u64) -> Self {
        Value::Literal(Literal::Integer(n.to_string()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Literal(Literal::String(s.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Value::Variable(name.into())
    }
}
