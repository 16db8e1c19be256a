//! CSSS Code Generator
//!
//! Compiles the CSSS AST into a JavaScript program. Rule selectors are
//! dropped, declarations become `let` bindings, `say` becomes
//! `console.log`, and loops become counted `for` statements.
//!
//! ```text
//! Program AST → compile() → CompilerOutput { js, declared, warnings }
//! ```
//!
//! The output is returned as text. Running it is up to the caller.

pub mod js;

use std::fmt;

use csss_parser::ast::Program;

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Spaces per loop nesting level.
    pub indent: usize,
}

impl Options {
    /// Widest accepted indent.
    pub const MAX_INDENT: usize = 16;
}

impl Default for Options {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// The compiled output from a CSSS program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    pub js: String,
    /// Every assigned name, in first-seen order (source spelling).
    pub declared: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Something suspicious that still compiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A variable is read before any visible declaration assigns it.
    UndeclaredVariable {
        name: String,
        line: usize,
        column: usize,
    },

    /// `times` outside a loop body has no effect.
    TimesOutsideLoop { line: usize, column: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UndeclaredVariable { name, line, column } => write!(
                f,
                "warning at line {line}, column {column}: `{name}` is not declared in this scope"
            ),
            Warning::TimesOutsideLoop { line, column } => write!(
                f,
                "warning at line {line}, column {column}: `times` outside a loop is ignored"
            ),
        }
    }
}

/// Code generation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("Codegen error at line {line}, column {column}: `times` must be an integer literal, got {found}")]
    InvalidTimes {
        found: String,
        line: usize,
        column: usize,
    },

    #[error("Codegen error at line {line}, column {column}: loop already has `times` (set at line {first_line})")]
    DuplicateTimes {
        line: usize,
        column: usize,
        first_line: usize,
    },

    #[error("Codegen error: indent of {indent} spaces exceeds the maximum of {max}", max = Options::MAX_INDENT)]
    InvalidIndent { indent: usize },

    #[error("Codegen error at line {line}, column {column}: `{name}` is reserved in JavaScript")]
    ReservedName {
        name: String,
        line: usize,
        column: usize,
    },
}

/// Compile a CSSS program AST into JavaScript.
pub fn compile(program: &Program, options: &Options) -> Result<CompilerOutput, GeneratorError> {
    let (js, declared, warnings) = js::JsGenerator::new(options).generate(program)?;
    log::debug!(
        "generated {} bytes of JavaScript, {} names declared, {} warnings",
        js.len(),
        declared.len(),
        warnings.len()
    );
    Ok(CompilerOutput {
        js,
        declared,
        warnings,
    })
}

/// Compile with default options and return only the script.
pub fn generate(program: &Program) -> Result<String, GeneratorError> {
    compile(program, &Options::default()).map(|output| output.js)
}
