//! Market price notification daemon.
//!
//! Wires every component into a single tick loop:
//! - civil clock and holiday calendar
//! - quote snapshot fetching
//! - notification scheduling
//! - rendering and fan-out to chat channels
//! - state snapshot and notice journal
//! - counters and periodic summaries

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, PersistenceConfig};
pub use error::{AppError, AppResult};
