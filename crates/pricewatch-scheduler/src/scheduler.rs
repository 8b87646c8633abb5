//! Notification scheduler state machine.
//!
//! Each tick, in order:
//! 1. Reset the day flags if the civil date changed.
//! 2. Classify the tick as holiday, in-session or out-of-session.
//! 3. Holiday: holiday notice in the open window, nothing else.
//!    In session: session-open notice in the open window, then a fetch if
//!    the routine update is due, followed by an optional emergency alert
//!    and the routine update.
//!    Out of session: session-close notice in the close window.
//!
//! Holiday, session-open and session-close notices go out at most once per
//! civil day. Emergency alerts are first-wins within the rate-limit window:
//! changes detected while limited are dropped, not queued.

use crate::config::SchedulerConfig;
use crate::notice::Notice;
use crate::state::ScheduleState;
use pricewatch_core::{CivilTime, DayKind, HolidayCalendar, SessionPhase, Snapshot};
use pricewatch_detector::ChangeDetector;
use pricewatch_feed::{FetchError, SnapshotFetcher};
use std::fmt;
use tracing::{debug, info, warn};

/// How a tick was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickClass {
    Holiday,
    InSession,
    OutOfSession(SessionPhase),
}

impl TickClass {
    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::InSession => "in_session",
            Self::OutOfSession(SessionPhase::BeforeOpen) => "before_open",
            Self::OutOfSession(_) => "after_close",
        }
    }
}

impl fmt::Display for TickClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened to the snapshot fetch during a tick.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not in session, so no fetch was considered.
    Skipped,
    /// In session but the routine update was not yet due.
    NotDue,
    Fetched {
        available: usize,
        total: usize,
        changes: usize,
    },
    Failed(FetchError),
}

impl FetchOutcome {
    /// Metrics label, `None` when no fetch was attempted.
    pub fn result_label(&self) -> Option<&'static str> {
        match self {
            Self::Skipped | Self::NotDue => None,
            Self::Fetched { .. } => Some("ok"),
            Self::Failed(e) => Some(e.kind()),
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub classification: TickClass,
    /// Notices to dispatch, in emission order.
    pub notices: Vec<Notice>,
    pub fetch: FetchOutcome,
    /// Whether this tick reset the day flags.
    pub day_rolled: bool,
}

/// The notification scheduler.
pub struct Scheduler {
    config: SchedulerConfig,
    calendar: HolidayCalendar,
    detector: ChangeDetector,
    state: ScheduleState,
}

impl Scheduler {
    /// Create a scheduler with empty state.
    pub fn new(config: SchedulerConfig, calendar: HolidayCalendar) -> Self {
        Self::with_state(config, calendar, ScheduleState::new())
    }

    /// Create a scheduler resuming from a restored state.
    pub fn with_state(
        config: SchedulerConfig,
        calendar: HolidayCalendar,
        state: ScheduleState,
    ) -> Self {
        let detector = ChangeDetector::new(config.detector.clone());
        Self {
            config,
            calendar,
            detector,
            state,
        }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Run one tick at `now`.
    ///
    /// Total: every input yields a report, fetch failures included.
    pub async fn tick(&mut self, now: &CivilTime, fetcher: &dyn SnapshotFetcher) -> TickReport {
        let day_rolled = self.state.roll_over(now.date.gregorian);
        if day_rolled {
            info!(date = %now.date, "Civil day started, day flags reset");
        }

        let mut notices = Vec::new();
        let day_kind = self.calendar.classify(&now.date);

        if day_kind.is_holiday() {
            self.holiday_tick(now, day_kind, &mut notices);
            return TickReport {
                classification: TickClass::Holiday,
                notices,
                fetch: FetchOutcome::Skipped,
                day_rolled,
            };
        }

        let session = self.config.session;
        if session.is_open(now) {
            if session.in_open_window(now) && !self.state.day_flags.session_open_notified {
                info!(date = %now.date, "Session open");
                notices.push(Notice::SessionOpen { date: now.date });
                self.state.day_flags.session_open_notified = true;
            }

            let fetch = if self.routine_due(now) {
                self.fetch_and_detect(now, fetcher, &mut notices).await
            } else {
                FetchOutcome::NotDue
            };

            return TickReport {
                classification: TickClass::InSession,
                notices,
                fetch,
                day_rolled,
            };
        }

        if session.in_close_window(now) && !self.state.day_flags.session_close_notified {
            info!(date = %now.date, "Session closed");
            notices.push(Notice::SessionClose { date: now.date });
            self.state.day_flags.session_close_notified = true;
        }

        TickReport {
            classification: TickClass::OutOfSession(session.classify(now)),
            notices,
            fetch: FetchOutcome::Skipped,
            day_rolled,
        }
    }

    fn holiday_tick(&mut self, now: &CivilTime, day_kind: DayKind, notices: &mut Vec<Notice>) {
        let name = match day_kind {
            DayKind::FixedHoliday { name } => {
                if !self.state.day_flags.suspicious_holiday_alerted {
                    warn!(
                        date = %now.date,
                        weekday = %now.weekday(),
                        name = ?name,
                        "Fixed-date holiday on a regular weekday, verify the holiday list"
                    );
                    notices.push(Notice::SuspiciousHoliday {
                        date: now.date,
                        name: name.clone(),
                    });
                    self.state.day_flags.suspicious_holiday_alerted = true;
                }
                name
            }
            _ => None,
        };

        if self.config.session.in_open_window(now) && !self.state.day_flags.holiday_notified {
            info!(date = %now.date, name = ?name, "Holiday, no updates today");
            notices.push(Notice::Holiday {
                date: now.date,
                name,
            });
            self.state.day_flags.holiday_notified = true;
        }
    }

    fn routine_due(&self, now: &CivilTime) -> bool {
        match self.state.last_routine_update_at {
            None => true,
            Some(last) => now.instant - last >= self.config.update_interval(),
        }
    }

    fn emergency_allowed(&self, now: &CivilTime) -> bool {
        match self.state.last_emergency_at {
            None => true,
            Some(last) => now.instant - last >= self.config.min_emergency_interval(),
        }
    }

    async fn fetch_and_detect(
        &mut self,
        now: &CivilTime,
        fetcher: &dyn SnapshotFetcher,
        notices: &mut Vec<Notice>,
    ) -> FetchOutcome {
        let timeout = self.config.fetch_timeout();
        let result = match tokio::time::timeout(timeout, fetcher.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(fetcher = fetcher.name(), error = %e, "Snapshot fetch failed, retrying next tick");
                return FetchOutcome::Failed(e);
            }
        };

        let changes = match &self.state.last_snapshot {
            Some(previous) => self.detector.detect(previous, &snapshot),
            None => Vec::new(),
        };
        let change_count = changes.len();

        if !changes.is_empty() {
            if self.emergency_allowed(now) {
                warn!(changes = change_count, "Emergency alert");
                notices.push(Notice::Emergency {
                    changes,
                    snapshot_time: snapshot.timestamp.clone(),
                });
                self.state.last_emergency_at = Some(now.instant);
            } else {
                info!(
                    changes = change_count,
                    last_emergency_at = ?self.state.last_emergency_at,
                    "Emergency alert suppressed by rate limit"
                );
            }
        }

        let outcome = FetchOutcome::Fetched {
            available: snapshot.available_count(),
            total: snapshot.len(),
            changes: change_count,
        };
        debug!(?outcome, "Routine update");

        notices.push(Notice::Routine {
            snapshot: snapshot.clone(),
        });
        self.accept_snapshot(snapshot, now);
        outcome
    }

    fn accept_snapshot(&mut self, snapshot: Snapshot, now: &CivilTime) {
        self.state.last_snapshot = Some(snapshot);
        self.state.last_routine_update_at = Some(now.instant);
    }
}
