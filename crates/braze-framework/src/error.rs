//! Error types for the Braze framework layer.

use braze_core::HandlerError;
use thiserror::Error;

/// Errors that can occur during context extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The activity variant does not match the expected view.
    #[error("activity type mismatch: expected '{expected}', got '{got}'")]
    ActivityMismatch {
        /// Expected view type name.
        expected: &'static str,
        /// The dispatched activity's type tag.
        got: String,
    },

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

impl From<ExtractError> for HandlerError {
    fn from(err: ExtractError) -> Self {
        HandlerError::msg(err.to_string())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
