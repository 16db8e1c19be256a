//! JavaScript code generator.
//!
//! Walks the program AST once and emits one statement per line.
//! Loops become counted `for` statements whose induction variable is
//! named after the loop's nesting depth (`_i0`, `_i1`, ...). Source
//! identifiers always start with a letter, so these never collide with
//! user variables.

use std::collections::HashSet;

use crate::{GeneratorError, Options, Warning};
use csss_parser::ast::{Declaration, Literal, LoopBlock, Node, Program, Value};

/// Words JavaScript never accepts as identifiers.
const KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "finally", "for", "function", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "new", "package",
    "private", "protected", "public", "return", "static", "super", "switch", "this", "throw",
    "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Names that are valid expressions but must not be rebound.
const VALUE_NAMES: &[&str] = &[
    "true", "false", "null", "undefined", "NaN", "Infinity", "arguments", "eval", "console",
];

/// Per-compilation generator state.
pub struct JsGenerator<'o> {
    options: &'o Options,
    out: String,
    /// Innermost scope last. The first entry is the program level.
    scopes: Vec<HashSet<String>>,
    declared: Vec<String>,
    warnings: Vec<Warning>,
}

impl<'o> JsGenerator<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            out: String::new(),
            scopes: vec![HashSet::new()],
            declared: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Generate the whole program. Consumes the generator and returns the
    /// script, the assigned names in first-seen order, and any warnings.
    pub fn generate(
        mut self,
        program: &Program,
    ) -> Result<(String, Vec<String>, Vec<Warning>), GeneratorError> {
        if self.options.indent > Options::MAX_INDENT {
            return Err(GeneratorError::InvalidIndent {
                indent: self.options.indent,
            });
        }
        for rule in &program.rules {
            log::trace!("rule `{}`: {} nodes", rule.selector, rule.declarations.len());
            for node in &rule.declarations {
                self.node(node, 0)?;
            }
        }
        Ok((self.out, self.declared, self.warnings))
    }

    fn node(&mut self, node: &Node, depth: usize) -> Result<(), GeneratorError> {
        match node {
            Node::Declaration(decl) => self.declaration(decl, depth),
            Node::Loop(block) | Node::NestedLoop(block) => self.repeat(block, depth),
        }
    }

    /// `loop { ... }` / `&loop { ... }`
    fn repeat(&mut self, block: &LoopBlock, depth: usize) -> Result<(), GeneratorError> {
        let count = loop_count(block)?;
        let var = format!("_i{depth}");

        self.line(
            depth,
            &format!("for (let {var} = 0; {var} < {count}; {var}++) {{"),
        );

        self.scopes.push(HashSet::new());
        for node in &block.body {
            if is_times(node) {
                continue;
            }
            self.node(node, depth + 1)?;
        }
        self.scopes.pop();

        self.line(depth, "}");
        Ok(())
    }

    fn declaration(&mut self, decl: &Declaration, depth: usize) -> Result<(), GeneratorError> {
        match decl.property.as_str() {
            "times" => {
                let warning = Warning::TimesOutsideLoop {
                    line: decl.span.line,
                    column: decl.span.column,
                };
                self.warn(warning);
                Ok(())
            }
            "say" => {
                let value = self.value(decl)?;
                self.line(depth, &format!("console.log({value});"));
                Ok(())
            }
            property => {
                let name = binding_name(property, decl)?;
                let value = self.value(decl)?;
                if self.is_visible(property) {
                    self.line(depth, &format!("{name} = {value};"));
                } else {
                    self.line(depth, &format!("let {name} = {value};"));
                    self.declare(property);
                }
                Ok(())
            }
        }
    }

    /// Render a declaration's value, checking variable references.
    fn value(&mut self, decl: &Declaration) -> Result<String, GeneratorError> {
        match &decl.value {
            Value::Literal(Literal::Integer(digits)) => Ok(digits.clone()),
            Value::Literal(Literal::String(s)) => Ok(string_literal(s)),
            Value::Variable(name) => {
                let rendered = reference_name(name, decl)?;
                if !self.is_visible(name) && !VALUE_NAMES.contains(&name.as_str()) {
                    self.warn(Warning::UndeclaredVariable {
                        name: name.clone(),
                        line: decl.span.line,
                        column: decl.span.column,
                    });
                }
                Ok(rendered)
            }
        }
    }

    // =========================================================================
    // Scope bookkeeping
    // =========================================================================

    fn is_visible(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
        if !self.declared.iter().any(|d| d == name) {
            self.declared.push(name.to_string());
        }
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn line(&mut self, depth: usize, text: &str) {
        let indent = " ".repeat(depth * self.options.indent);
        self.out.push_str(&indent);
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn is_times(node: &Node) -> bool {
    matches!(node, Node::Declaration(d) if d.property == "times")
}

/// Find the repeat count of a loop body. At most one `times` is allowed and
/// it must be an integer literal; without one the body runs once.
/// The count is rendered as written, so it is not limited to any integer width.
fn loop_count(block: &LoopBlock) -> Result<&str, GeneratorError> {
    let mut found: Option<(&Declaration, &str)> = None;

    for node in &block.body {
        let Node::Declaration(decl) = node else {
            continue;
        };
        if decl.property != "times" {
            continue;
        }
        if let Some((first, _)) = found {
            return Err(GeneratorError::DuplicateTimes {
                line: decl.span.line,
                column: decl.span.column,
                first_line: first.span.line,
            });
        }
        let count = match &decl.value {
            Value::Literal(Literal::Integer(digits)) => digits.as_str(),
            Value::Literal(Literal::String(s)) => {
                return Err(invalid_times(decl, string_literal(s)));
            }
            Value::Variable(name) => return Err(invalid_times(decl, name.clone())),
        };
        found = Some((decl, count));
    }

    Ok(found.map_or("1", |(_, count)| count))
}

fn invalid_times(decl: &Declaration, found: String) -> GeneratorError {
    GeneratorError::InvalidTimes {
        found,
        line: decl.span.line,
        column: decl.span.column,
    }
}

/// Render a source identifier as a JS identifier. Hyphens become `_`.
pub fn js_identifier(name: &str) -> String {
    name.replace('-', "_")
}

fn reference_name(name: &str, decl: &Declaration) -> Result<String, GeneratorError> {
    let ident = js_identifier(name);
    if KEYWORDS.contains(&ident.as_str()) {
        return Err(reserved(ident, decl));
    }
    Ok(ident)
}

fn binding_name(name: &str, decl: &Declaration) -> Result<String, GeneratorError> {
    let ident = reference_name(name, decl)?;
    if VALUE_NAMES.contains(&ident.as_str()) {
        return Err(reserved(ident, decl));
    }
    Ok(ident)
}

fn reserved(name: String, decl: &Declaration) -> GeneratorError {
    GeneratorError::ReservedName {
        name,
        line: decl.span.line,
        column: decl.span.column,
    }
}

/// Render a string as a double-quoted JS string literal.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
