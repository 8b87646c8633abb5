//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] pricewatch_scheduler::SchedulerError),

    #[error("Feed error: {0}")]
    Feed(#[from] pricewatch_feed::FetchError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] pricewatch_notify::DispatchError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] pricewatch_telemetry::TelemetryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] pricewatch_persistence::PersistenceError),
}

pub type AppResult<T> = Result<T, AppError>;
