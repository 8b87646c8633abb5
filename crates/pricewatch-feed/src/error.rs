//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

/// Snapshot fetch failure. Always recoverable: the next tick retries.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Status { .. } => "status",
            Self::Timeout(_) => "timeout",
            Self::Malformed(_) => "malformed",
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
