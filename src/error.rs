//! Error types for the interpreter

use thiserror::Error;

/// Source location information for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Main error type for the interpreter.
///
/// The first four variants are script-level failures: they are reported to
/// the embedder but leave the engine in a usable state. The remaining
/// variants are engine-level. `Internal` indicates a broken contract between
/// compiler and runtime and must never be treated as a script error.
#[derive(Debug, Error)]
pub enum JsError {
    #[error("SyntaxError: {message} at {location}")]
    SyntaxError {
        message: String,
        location: SourceLocation,
    },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("ReferenceError: {name} is not defined")]
    ReferenceError { name: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    #[error("out of memory")]
    OutOfMemory,

    #[error("unexpected engine state: {0}")]
    UnexpectedState(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl JsError {
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        JsError::SyntaxError {
            message: message.into(),
            location: SourceLocation { line, column },
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn reference_error(name: impl Into<String>) -> Self {
        JsError::ReferenceError { name: name.into() }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    pub fn unexpected_state(state: &'static str) -> Self {
        JsError::UnexpectedState(state)
    }

    /// Create an internal error for states that indicate a compiler/runtime
    /// contract violation rather than a user mistake.
    pub fn internal(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// Whether the error is visible to script code, as opposed to an
    /// engine-level failure.
    pub fn is_script_error(&self) -> bool {
        matches!(
            self,
            JsError::SyntaxError { .. }
                | JsError::TypeError { .. }
                | JsError::ReferenceError { .. }
                | JsError::RangeError { .. }
        )
    }
}
