//! Notification scheduling.
//!
//! The scheduler owns all mutable scheduling state and decides, once per
//! tick, which notices to emit:
//! - holiday and suspicious-holiday notices
//! - session-open and session-close notices
//! - routine snapshot updates
//! - rate-limited emergency alerts on significant price moves
//!
//! Every tick re-classifies from the current civil time; nothing is
//! edge-triggered on the previous tick.

pub mod config;
pub mod error;
pub mod notice;
pub mod scheduler;
pub mod state;

pub use config::{CalendarConfig, SchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
pub use notice::{Audience, Notice, NoticeKind};
pub use scheduler::{FetchOutcome, Scheduler, TickClass, TickReport};
pub use state::{DayFlags, ScheduleState};
