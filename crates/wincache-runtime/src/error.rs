//! Runtime error types.

use thiserror::Error;

/// A fetch collaborator could not answer a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The driver task has stopped.
    #[error("store driver is no longer running")]
    Closed,

    /// The last foreground fetch failed.
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
