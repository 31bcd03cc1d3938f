use miette::Diagnostic;
use thiserror::Error;

/// Result type for coalescing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the coalescing pass.
///
/// None of these ever reach a user of the pass: analysis failures are caught
/// by the driver, which leaves the affected function untouched. They exist so
/// the stages can report *why* a function was skipped.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error("liveness analysis failed: {message}")]
    #[diagnostic(code(varcoalesce::liveness_error))]
    Liveness { message: String },

    #[error("malformed control flow graph: {message}")]
    #[diagnostic(code(varcoalesce::cfg_error))]
    Cfg { message: String },

    #[error("parse error at offset {offset}: {message}")]
    #[diagnostic(code(varcoalesce::parse_error))]
    Parse { offset: usize, message: String },

    #[error("internal error: {message}")]
    #[diagnostic(code(varcoalesce::internal_error))]
    Internal { message: String },
}

impl Error {
    /// Create a parse error
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}
