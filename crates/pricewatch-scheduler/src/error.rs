//! Scheduler error types.
//!
//! Only raised while building the scheduler; ticks themselves never fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Core(#[from] pricewatch_core::CoreError),

    #[error(transparent)]
    Detector(#[from] pricewatch_detector::DetectorError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
