// Error types for sentiment operations

use thiserror::Error;

/// Result type alias for sentiment operations
pub type Result<T> = std::result::Result<T, SentimentError>;

/// Errors that can occur across the sentiment pipeline
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Record store unreachable or a query against it failed.
    /// Carries the operation (with parameters) that failed so the caller can
    /// map it to a user-facing response without losing context.
    #[error("data unavailable during {operation}: {message}")]
    DataUnavailable { operation: String, message: String },

    /// Caller-supplied argument violated a precondition. Raised before any
    /// store or network access is attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Managed classifier call failed
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Object-store archive call failed
    #[error("archive error: {0}")]
    Archive(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SentimentError {
    /// Create a data-unavailable error annotated with the failing operation
    pub fn unavailable(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SentimentError::DataUnavailable {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SentimentError::InvalidArgument(msg.into())
    }

    /// Create a classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        SentimentError::Classifier(msg.into())
    }

    /// Create an archive error
    pub fn archive(msg: impl Into<String>) -> Self {
        SentimentError::Archive(msg.into())
    }

    /// True for errors the caller caused (as opposed to dependency failures)
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SentimentError::InvalidArgument(_))
    }
}
