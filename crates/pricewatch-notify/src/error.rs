//! Dispatch error types.

use thiserror::Error;

/// Delivery failure on one channel. Never affects scheduling state.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("HTTP {status}: {description}")]
    Status { status: u16, description: String },

    #[error("Rejected by API: {0}")]
    Rejected(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
