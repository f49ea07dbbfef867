//! Error types for the Braze runtime.

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration could not be assembled or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(err.to_string())
    }
}

/// Errors that can occur in runtime operations.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The inbound queue is closed; the runtime has stopped.
    #[error("runtime inbound queue is closed")]
    QueueClosed,

    /// The dispatch task dropped its response channel.
    #[error("dispatch response was dropped")]
    ResponseDropped,
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
