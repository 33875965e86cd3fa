// ABOUTME: Error types for lexing, parsing, evaluation, and CLI usage failures

use thiserror::Error;

/// A 1-based line/column pair identifying where a token or character came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Location { line, col }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, col {}", self.line, self.col)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LambdaError {
    /// Lex or parse failure: unexpected character, unbalanced brackets, expected-but-missing.
    #[error("{at}: {message}")]
    SyntaxError { at: Location, message: String },

    /// Free variable encountered under force_eval, or rebinding an already-bound name.
    #[error("{at}: {message}")]
    NameError { at: Location, message: String },

    /// Operator applied to operand variants it has no table entry for.
    #[error("{at}: {message}")]
    TypeError { at: Location, message: String },

    /// Application whose target is not a function and cannot be reduced further.
    #[error("{at}: {message}")]
    ValueError { at: Location, message: String },

    /// CLI argument problems: unknown/duplicate flag, missing file.
    #[error("{message}")]
    UsageError { message: String },
}

impl LambdaError {
    pub fn syntax(at: Location, message: impl Into<String>) -> Self {
        LambdaError::SyntaxError {
            at,
            message: message.into(),
        }
    }

    pub fn expected(at: Location, expected: &str, got: &str) -> Self {
        LambdaError::SyntaxError {
            at,
            message: format!("expected {expected}, got '{got}'"),
        }
    }

    pub fn name(at: Location, message: impl Into<String>) -> Self {
        LambdaError::NameError {
            at,
            message: message.into(),
        }
    }

    pub fn type_error(at: Location, message: impl Into<String>) -> Self {
        LambdaError::TypeError {
            at,
            message: message.into(),
        }
    }

    pub fn value(at: Location, message: impl Into<String>) -> Self {
        LambdaError::ValueError {
            at,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        LambdaError::UsageError {
            message: message.into(),
        }
    }
}
