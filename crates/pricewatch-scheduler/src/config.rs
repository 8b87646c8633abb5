//! Scheduler and calendar configuration.

use crate::error::{SchedulerError, SchedulerResult};
use chrono::Weekday;
use pricewatch_core::calendar::DEFAULT_UTC_OFFSET_MINUTES;
use pricewatch_core::{CalendarSystem, CivilClock, HolidayCalendar, HolidayEntry, MonthDay, SessionWindow};
use pricewatch_detector::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing, session and detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Tick cadence in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Minimum spacing of routine updates in seconds.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Minimum spacing of emergency alerts in seconds.
    #[serde(default = "default_min_emergency_interval_secs")]
    pub min_emergency_interval_secs: u64,
    /// Upper bound on a single snapshot fetch in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub session: SessionWindow,
    #[serde(default)]
    pub detector: DetectorConfig,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_update_interval_secs() -> u64 {
    3600 // hourly
}

fn default_min_emergency_interval_secs() -> u64 {
    1800
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            update_interval_secs: default_update_interval_secs(),
            min_emergency_interval_secs: default_min_emergency_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            session: SessionWindow::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn update_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(saturating_i64(self.update_interval_secs))
    }

    pub fn min_emergency_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(saturating_i64(self.min_emergency_interval_secs))
    }

    /// Validate configuration values.
    ///
    /// A zero `min_emergency_interval_secs` disables emergency rate limiting.
    pub fn validate(&self) -> SchedulerResult<()> {
        for (name, value) in [
            ("poll_interval_secs", self.poll_interval_secs),
            ("update_interval_secs", self.update_interval_secs),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
        ] {
            if value == 0 {
                return Err(SchedulerError::ConfigError(format!(
                    "{name} must be positive"
                )));
            }
        }
        self.session.validate()?;
        self.detector.validate()?;
        Ok(())
    }
}

/// Longer spacings behave the same as one year.
const MAX_INTERVAL_SECS: u64 = 366 * 24 * 3600;

fn saturating_i64(secs: u64) -> i64 {
    secs.min(MAX_INTERVAL_SECS) as i64
}

/// Civil clock and holiday calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Local offset in minutes east of UTC.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// Calendar the holiday keys are expressed in.
    #[serde(default)]
    pub system: CalendarSystem,
    /// Weekly rest day.
    #[serde(default = "default_rest_day")]
    pub rest_day: Weekday,
    #[serde(default)]
    pub holidays: Vec<HolidayEntry>,
    /// Dates that are never holidays, overriding both the rest day and
    /// the fixed list.
    #[serde(default)]
    pub exceptions: Vec<MonthDay>,
}

fn default_utc_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_rest_day() -> Weekday {
    Weekday::Fri
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            system: CalendarSystem::default(),
            rest_day: default_rest_day(),
            holidays: Vec::new(),
            exceptions: Vec::new(),
        }
    }
}

impl CalendarConfig {
    pub fn clock(&self) -> SchedulerResult<CivilClock> {
        Ok(CivilClock::from_offset_minutes(self.utc_offset_minutes)?)
    }

    /// Build the validated holiday calendar.
    pub fn holiday_calendar(&self) -> SchedulerResult<HolidayCalendar> {
        Ok(HolidayCalendar::new(
            self.system,
            self.rest_day,
            self.holidays.clone(),
            self.exceptions.clone(),
        )?)
    }
}
