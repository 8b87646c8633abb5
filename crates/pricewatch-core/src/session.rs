//! Session window gate.
//!
//! Pure classification of local civil time against the configured
//! `[start_hour, end_hour)` notification session. Nothing here depends on
//! scheduling state.

use crate::calendar::CivilTime;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

fn default_start_hour() -> u32 {
    11
}

fn default_end_hour() -> u32 {
    20
}

fn default_notice_window_minutes() -> u32 {
    30
}

/// Position of a tick relative to the day's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    BeforeOpen,
    InSession,
    AfterClose,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeOpen => write!(f, "BeforeOpen"),
            Self::InSession => write!(f, "InSession"),
            Self::AfterClose => write!(f, "AfterClose"),
        }
    }
}

/// Daily session window in local hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    /// Exclusive.
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    /// Length of the open/close notice windows, starting on the hour.
    #[serde(default = "default_notice_window_minutes")]
    pub notice_window_minutes: u32,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            notice_window_minutes: default_notice_window_minutes(),
        }
    }
}

impl SessionWindow {
    /// Create a validated window.
    pub fn new(start_hour: u32, end_hour: u32, notice_window_minutes: u32) -> Result<Self> {
        let window = Self {
            start_hour,
            end_hour,
            notice_window_minutes,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(CoreError::InvalidConfig(format!(
                "session window [{}, {}) must satisfy start < end <= 24",
                self.start_hour, self.end_hour
            )));
        }
        if !(1..=60).contains(&self.notice_window_minutes) {
            return Err(CoreError::InvalidConfig(format!(
                "notice_window_minutes must be in 1..=60, got {}",
                self.notice_window_minutes
            )));
        }
        Ok(())
    }

    /// `start_hour <= now.hour < end_hour`.
    #[must_use]
    pub fn is_open(&self, now: &CivilTime) -> bool {
        (self.start_hour..self.end_hour).contains(&now.hour)
    }

    /// Within the first minutes of the opening hour.
    #[must_use]
    pub fn in_open_window(&self, now: &CivilTime) -> bool {
        now.hour == self.start_hour && now.minute < self.notice_window_minutes
    }

    /// Within the first minutes of the closing hour.
    #[must_use]
    pub fn in_close_window(&self, now: &CivilTime) -> bool {
        now.hour == self.end_hour && now.minute < self.notice_window_minutes
    }

    #[must_use]
    pub fn classify(&self, now: &CivilTime) -> SessionPhase {
        if now.hour < self.start_hour {
            SessionPhase::BeforeOpen
        } else if now.hour < self.end_hour {
            SessionPhase::InSession
        } else {
            SessionPhase::AfterClose
        }
    }
}
