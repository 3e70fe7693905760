//! Route pattern compilation.
//!
//! # Responsibilities
//! - Tokenize a pattern source (`/users/:id(/:rest+)`) into typed tokens
//! - Reject patterns whose groups do not balance or whose capture names repeat
//! - Build an anchored matching program from the tokens
//!
//! # Design Decisions
//! - Literal text is escaped before it becomes part of an expression, so `.`
//!   or `+` inside a segment only ever match themselves
//! - Capture groups are positional; names are kept beside the program in
//!   left-to-right order
//! - A pattern made only of literal text compiles to an exact comparison

use regex::Regex;
use thiserror::Error;

/// Errors that can occur while compiling a route pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A `(` without its `)` or the other way around.
    #[error("unbalanced optional group in pattern '{0}'")]
    UnbalancedGroup(String),

    /// The same capture name is used twice in one pattern.
    #[error("capture ':{name}' appears more than once in pattern '{pattern}'")]
    DuplicateCapture { pattern: String, name: String },

    /// The matching expression could not be built.
    #[error("pattern '{pattern}' could not be compiled: {source}")]
    Expression {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One element of a tokenized pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Text that must appear verbatim in the path.
    Literal(String),
    /// A named placeholder. Greedy captures may span `/`.
    Capture { name: String, greedy: bool },
    /// A sub-pattern that may be present or absent as a whole.
    Optional(Vec<PatternToken>),
}

/// How a compiled pattern is evaluated against a path.
#[derive(Debug, Clone)]
pub(crate) enum Program {
    Exact(String),
    Expression(Regex),
}

/// A route pattern ready to be matched against request paths.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    tokens: Vec<PatternToken>,
    capture_names: Vec<String>,
    program: Program,
}

impl CompiledPattern {
    /// Compile a pattern source.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let tokens = tokenize(source)?;

        let mut capture_names = Vec::new();
        collect_capture_names(&tokens, source, &mut capture_names)?;

        let literal_only = tokens
            .iter()
            .all(|t| matches!(t, PatternToken::Literal(_)));

        let program = if literal_only {
            Program::Exact(source.to_string())
        } else {
            let mut expression = String::from("^");
            write_expression(&tokens, &mut expression);
            expression.push('$');
            let regex = Regex::new(&expression).map_err(|e| PatternError::Expression {
                pattern: source.to_string(),
                source: e,
            })?;
            Program::Expression(regex)
        };

        tracing::trace!(
            pattern = source,
            captures = capture_names.len(),
            exact = literal_only,
            "Compiled route pattern"
        );

        Ok(Self {
            source: source.to_string(),
            tokens,
            capture_names,
            program,
        })
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Capture names in the order they appear in the pattern.
    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    /// True when matching is a plain string comparison.
    pub fn is_exact(&self) -> bool {
        matches!(self.program, Program::Exact(_))
    }

    pub(crate) fn program(&self) -> &Program {
        &self.program
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn flush_literal(literal: &mut String, into: Option<&mut Vec<PatternToken>>) {
    if literal.is_empty() {
        return;
    }
    if let Some(tokens) = into {
        tokens.push(PatternToken::Literal(std::mem::take(literal)));
    }
}

/// Split a pattern source into tokens.
///
/// `:name` and `:name+` become captures, `( ... )` becomes an optional
/// group, everything else is literal. A `:` not followed by a name
/// character stays literal.
pub fn tokenize(source: &str) -> Result<Vec<PatternToken>, PatternError> {
    // Bottom entry is the pattern itself, one more per open group.
    let mut stack: Vec<Vec<PatternToken>> = vec![Vec::new()];
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek().is_some_and(|n| is_name_char(*n)) => {
                let mut name = String::new();
                while let Some(n) = chars.next_if(|n| is_name_char(*n)) {
                    name.push(n);
                }
                let greedy = chars.next_if_eq(&'+').is_some();
                flush_literal(&mut literal, stack.last_mut());
                if let Some(top) = stack.last_mut() {
                    top.push(PatternToken::Capture { name, greedy });
                }
            }
            '(' => {
                flush_literal(&mut literal, stack.last_mut());
                stack.push(Vec::new());
            }
            ')' => {
                flush_literal(&mut literal, stack.last_mut());
                if stack.len() < 2 {
                    return Err(PatternError::UnbalancedGroup(source.to_string()));
                }
                let group = stack.pop().unwrap_or_default();
                if let Some(top) = stack.last_mut() {
                    top.push(PatternToken::Optional(group));
                }
            }
            _ => literal.push(c),
        }
    }

    flush_literal(&mut literal, stack.last_mut());
    if stack.len() != 1 {
        return Err(PatternError::UnbalancedGroup(source.to_string()));
    }
    Ok(stack.pop().unwrap_or_default())
}

fn collect_capture_names(
    tokens: &[PatternToken],
    source: &str,
    names: &mut Vec<String>,
) -> Result<(), PatternError> {
    for token in tokens {
        match token {
            PatternToken::Literal(_) => {}
            PatternToken::Capture { name, .. } => {
                if names.contains(name) {
                    return Err(PatternError::DuplicateCapture {
                        pattern: source.to_string(),
                        name: name.clone(),
                    });
                }
                names.push(name.clone());
            }
            PatternToken::Optional(inner) => collect_capture_names(inner, source, names)?,
        }
    }
    Ok(())
}

fn write_expression(tokens: &[PatternToken], out: &mut String) {
    for token in tokens {
        match token {
            PatternToken::Literal(text) => out.push_str(&regex::escape(text)),
            // Greedy captures never end on a slash.
            PatternToken::Capture { greedy: true, .. } => out.push_str("(.*[^/])"),
            PatternToken::Capture { greedy: false, .. } => out.push_str("([^/]+)"),
            PatternToken::Optional(inner) => {
                out.push_str("(?:");
                write_expression(inner, out);
                out.push_str(")?");
            }
        }
    }
}
