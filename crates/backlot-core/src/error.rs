use thiserror::Error;

use crate::domain::JobType;
use crate::ports::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error: terminal, never retried.
    #[error("no processor registered for job type {0}")]
    ProcessorNotFound(JobType),

    /// Content store failure that should abort the handler (and trigger retry).
    #[error("content store: {0}")]
    Store(#[from] StoreError),

    /// Handler-reported failure (transient, subject to retry).
    #[error("{0}")]
    Handler(String),
}

impl CoreError {
    pub fn handler(message: impl Into<String>) -> Self {
        CoreError::Handler(message.into())
    }
}
