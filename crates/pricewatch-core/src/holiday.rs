//! Non-trading day calendar.
//!
//! Resolution order, first match wins:
//! 1. `(month, day)` in the exception set → trading day
//! 2. weekday is the configured rest day → rest day
//! 3. `(month, day)` in the fixed holiday list → fixed holiday
//! 4. otherwise → trading day
//!
//! A [`DayKind::FixedHoliday`] match is the case an operator should double
//! check: fixed-date lists keyed in one calendar drift against the other
//! from year to year and go stale.

use crate::calendar::{CalendarSystem, CivilDate};
use crate::error::{CoreError, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Recurring `(month, day)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    fn validate(&self, system: CalendarSystem) -> Result<()> {
        let max_day = system.max_day(self.month).ok_or_else(|| {
            CoreError::InvalidConfig(format!("{self}: month out of range for {system}"))
        })?;
        if self.day == 0 || self.day > max_day {
            return Err(CoreError::InvalidConfig(format!(
                "{self}: day out of range for {system} (max {max_day})"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Fixed-date holiday as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub name: Option<String>,
}

impl HolidayEntry {
    pub fn key(&self) -> MonthDay {
        MonthDay::new(self.month, self.day)
    }
}

/// Classification of a civil date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayKind {
    TradingDay,
    RestDay,
    FixedHoliday { name: Option<String> },
}

impl DayKind {
    pub fn is_holiday(&self) -> bool {
        !matches!(self, Self::TradingDay)
    }
}

/// Rest day, fixed-date holidays and exceptions.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    system: CalendarSystem,
    rest_day: Weekday,
    holidays: HashMap<MonthDay, Option<String>>,
    exceptions: HashSet<MonthDay>,
}

impl HolidayCalendar {
    /// Build a validated calendar.
    ///
    /// Rejects out-of-range keys and duplicates within either list. A key
    /// present in both lists is allowed; the exception wins.
    pub fn new(
        system: CalendarSystem,
        rest_day: Weekday,
        holidays: Vec<HolidayEntry>,
        exceptions: Vec<MonthDay>,
    ) -> Result<Self> {
        let mut holiday_map = HashMap::with_capacity(holidays.len());
        for entry in holidays {
            let key = entry.key();
            key.validate(system)?;
            if holiday_map.insert(key, entry.name).is_some() {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate holiday {key}"
                )));
            }
        }

        let mut exception_set = HashSet::with_capacity(exceptions.len());
        for key in exceptions {
            key.validate(system)?;
            if !exception_set.insert(key) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate holiday exception {key}"
                )));
            }
        }

        Ok(Self {
            system,
            rest_day,
            holidays: holiday_map,
            exceptions: exception_set,
        })
    }

    pub fn rest_day(&self) -> Weekday {
        self.rest_day
    }

    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    /// Classify `date`.
    pub fn classify(&self, date: &CivilDate) -> DayKind {
        let (month, day) = date.month_day(self.system);
        let key = MonthDay::new(month, day);

        if self.exceptions.contains(&key) {
            return DayKind::TradingDay;
        }
        if date.weekday == self.rest_day {
            return DayKind::RestDay;
        }
        match self.holidays.get(&key) {
            Some(name) => DayKind::FixedHoliday { name: name.clone() },
            None => DayKind::TradingDay,
        }
    }

    pub fn is_holiday(&self, date: &CivilDate) -> bool {
        self.classify(date).is_holiday()
    }
}
