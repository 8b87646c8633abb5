//! Significant price change detection.
//!
//! Compares a freshly fetched snapshot against the last accepted one and
//! reports every symbol whose move exceeds the configured percentage
//! threshold. Results are ordered by symbol declaration order so that
//! rendered alerts are reproducible.

pub mod change;
pub mod config;
pub mod detector;
pub mod error;

pub use change::SignificantChange;
pub use config::DetectorConfig;
pub use detector::ChangeDetector;
pub use error::{DetectorError, DetectorResult};
