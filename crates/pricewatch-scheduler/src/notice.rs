//! Notices emitted by the scheduler.

use pricewatch_core::{CivilDate, Snapshot};
use pricewatch_detector::SignificantChange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a notice is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Public channels.
    Subscribers,
    /// Operator-only channels.
    Operator,
}

/// Notice category, used as a metrics label and journal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Holiday,
    SuspiciousHoliday,
    SessionOpen,
    SessionClose,
    Routine,
    Emergency,
}

impl NoticeKind {
    pub const ALL: [NoticeKind; 6] = [
        NoticeKind::Holiday,
        NoticeKind::SuspiciousHoliday,
        NoticeKind::SessionOpen,
        NoticeKind::SessionClose,
        NoticeKind::Routine,
        NoticeKind::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::SuspiciousHoliday => "suspicious_holiday",
            Self::SessionOpen => "session_open",
            Self::SessionClose => "session_close",
            Self::Routine => "routine",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision to notify, before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Market closed today.
    Holiday {
        date: CivilDate,
        name: Option<String>,
    },
    /// A fixed-date holiday matched on a regular weekday; the list may be
    /// stale and deserves a manual check.
    SuspiciousHoliday {
        date: CivilDate,
        name: Option<String>,
    },
    SessionOpen {
        date: CivilDate,
    },
    SessionClose {
        date: CivilDate,
    },
    Routine {
        snapshot: Snapshot,
    },
    /// Batched alert for every symbol that crossed the threshold.
    Emergency {
        changes: Vec<SignificantChange>,
        snapshot_time: Option<String>,
    },
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Self::Holiday { .. } => NoticeKind::Holiday,
            Self::SuspiciousHoliday { .. } => NoticeKind::SuspiciousHoliday,
            Self::SessionOpen { .. } => NoticeKind::SessionOpen,
            Self::SessionClose { .. } => NoticeKind::SessionClose,
            Self::Routine { .. } => NoticeKind::Routine,
            Self::Emergency { .. } => NoticeKind::Emergency,
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            Self::SuspiciousHoliday { .. } => Audience::Operator,
            _ => Audience::Subscribers,
        }
    }
}
