//! Prometheus metrics and structured logging for pricewatch.
//!
//! - Structured logging with tracing (JSON in production)
//! - Prometheus counters for ticks, fetches, notices and deliveries
//! - Periodic summary of the counters in the log

pub mod daily_stats;
pub mod error;
pub mod logging;
pub mod metrics;

pub use daily_stats::{DailyStatsReporter, NoticeStats};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
