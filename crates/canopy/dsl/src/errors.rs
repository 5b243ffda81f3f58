//! Diagnostics produced by the DSL front end
//!
//! Syntax and semantic errors are data, not control flow: the parser and
//! validator collect them into lists so a caller (an editor pane, the
//! CLI) can render the complete set at once. Both types implement
//! `std::error::Error` so they format well anywhere.

use serde::{Deserialize, Serialize};

/// A lexical or grammatical error, located at a source line.
///
/// Recoverable: the parser records it and continues at the next
/// top-level declaration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("syntax error at line {line}, column {col}: {message}")]
pub struct SyntaxError {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            col,
            message: message.into(),
        }
    }
}

/// A name, reference, or range violation found by the validator.
///
/// Collected exhaustively; execution is blocked while any exist.
#[derive(Clone, Debug, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum SemanticError {
    #[error(
        "duplicate name '{name}': {kind} declared on line {first_line}, \
         redeclared as {duplicate_kind} on line {duplicate_line}"
    )]
    DuplicateName {
        name: String,
        kind: String,
        first_line: usize,
        duplicate_kind: String,
        duplicate_line: usize,
    },

    #[error("{context} on line {line} references undeclared agent '{name}'")]
    UnknownAgent {
        /// What holds the reference, e.g. `workflow 'Pipeline'` or `step 'route'`
        context: String,
        name: String,
        line: usize,
    },

    #[error("{field} of {owner} on line {line} is out of range: {message}")]
    OutOfRange {
        owner: String,
        field: String,
        line: usize,
        message: String,
    },

    #[error("{field} of {owner} on line {line} is invalid: {message}")]
    InvalidValue {
        owner: String,
        field: String,
        line: usize,
        message: String,
    },

    #[error("{owner} on line {line} is missing required field '{field}'")]
    MissingField {
        owner: String,
        field: String,
        line: usize,
    },

    #[error("task '{name}' on line {line} declares no steps")]
    EmptyTask { name: String, line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(7, 12, "expected '{' after agent name");
        assert_eq!(
            err.to_string(),
            "syntax error at line 7, column 12: expected '{' after agent name"
        );
    }

    #[test]
    fn test_duplicate_name_display_names_both_lines() {
        let err = SemanticError::DuplicateName {
            name: "TaskScheduler".into(),
            kind: "agent".into(),
            first_line: 3,
            duplicate_kind: "agent".into(),
            duplicate_line: 19,
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("line 19"));
        assert!(msg.contains("TaskScheduler"));
    }

    #[test]
    fn test_errors_serialize() {
        let err = SemanticError::EmptyTask {
            name: "noop".into(),
            line: 4,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: SemanticError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
