//! Scheduling state.
//!
//! Owned exclusively by the tick loop. Serializable so that it can be
//! persisted across restarts; a restored state from an earlier day is
//! reset by the normal rollover rule on the first tick.

use chrono::{DateTime, NaiveDate, Utc};
use pricewatch_core::Snapshot;
use serde::{Deserialize, Serialize};

/// Once-per-day notification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFlags {
    pub session_open_notified: bool,
    pub session_close_notified: bool,
    pub holiday_notified: bool,
    pub suspicious_holiday_alerted: bool,
}

/// Process-wide scheduling state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Last successfully fetched snapshot.
    pub last_snapshot: Option<Snapshot>,
    pub last_emergency_at: Option<DateTime<Utc>>,
    pub last_routine_update_at: Option<DateTime<Utc>>,
    pub day_flags: DayFlags,
    /// Civil date `day_flags` apply to. `None` before the first tick.
    pub current_civil_date: Option<NaiveDate>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `date`, clearing the day flags if it differs from the
    /// current civil date. Returns whether a reset happened.
    pub fn roll_over(&mut self, date: NaiveDate) -> bool {
        if self.current_civil_date == Some(date) {
            return false;
        }
        self.day_flags = DayFlags::default();
        self.current_civil_date = Some(date);
        true
    }
}
