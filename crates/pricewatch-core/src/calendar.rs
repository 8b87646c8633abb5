//! Clock and civil calendar adapter.
//!
//! All conversion between instants and local civil time lives here. The
//! scheduler only ever sees a [`CivilTime`] (civil date, weekday, hour,
//! minute) and never performs offset arithmetic itself.
//!
//! Local time uses a fixed UTC offset (the default +03:30 matches Tehran,
//! which has not observed DST since 2022). Every [`CivilDate`] also carries
//! its Jalali (Solar Hijri) representation, the calendar in which the
//! source market publishes its holidays.

use crate::error::{CoreError, Result};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Timelike, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default local offset in minutes east of UTC (+03:30).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 210;

/// Calendar system a `(month, day)` key is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarSystem {
    Gregorian,
    #[default]
    Jalali,
}

impl CalendarSystem {
    /// Maximum day number a month can have in this system.
    pub fn max_day(&self, month: u32) -> Option<u32> {
        match (self, month) {
            (Self::Gregorian, 2) => Some(29),
            (Self::Gregorian, 4 | 6 | 9 | 11) => Some(30),
            (Self::Gregorian, 1..=12) => Some(31),
            (Self::Jalali, 1..=6) => Some(31),
            (Self::Jalali, 7..=12) => Some(30),
            _ => None,
        }
    }
}

impl fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gregorian => write!(f, "gregorian"),
            Self::Jalali => write!(f, "jalali"),
        }
    }
}

/// Date in the Jalali (Solar Hijri) calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Convert a Gregorian date.
    ///
    /// Arithmetic conversion based on the 33-year cycle; exact for the
    /// Gregorian years 1600..=3000.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        const CUMULATIVE_DAYS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

        let gy = i64::from(date.year());
        let gm = date.month() as usize;
        let gd = i64::from(date.day());

        let gy2 = if gm > 2 { gy + 1 } else { gy };
        let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
            + gd
            + CUMULATIVE_DAYS[gm - 1];

        let mut jy = -1595 + 33 * (days / 12_053);
        days %= 12_053;
        jy += 4 * (days / 1461);
        days %= 1461;
        if days > 365 {
            jy += (days - 1) / 365;
            days = (days - 1) % 365;
        }

        let (jm, jd) = if days < 186 {
            (1 + days / 31, 1 + days % 31)
        } else {
            (7 + (days - 186) / 30, 1 + (days - 186) % 30)
        };

        Self {
            year: jy as i32,
            month: jm as u32,
            day: jd as u32,
        }
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// Local civil date with both calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivilDate {
    pub gregorian: NaiveDate,
    pub weekday: Weekday,
    pub jalali: JalaliDate,
}

impl CivilDate {
    pub fn from_gregorian(gregorian: NaiveDate) -> Self {
        Self {
            gregorian,
            weekday: gregorian.weekday(),
            jalali: JalaliDate::from_gregorian(gregorian),
        }
    }

    /// `(month, day)` of this date in the given calendar system.
    pub fn month_day(&self, system: CalendarSystem) -> (u32, u32) {
        match system {
            CalendarSystem::Gregorian => (self.gregorian.month(), self.gregorian.day()),
            CalendarSystem::Jalali => (self.jalali.month, self.jalali.day),
        }
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.gregorian, self.jalali)
    }
}

/// A resolved "now" in local civil time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    /// The underlying instant.
    pub instant: DateTime<Utc>,
    pub date: CivilDate,
    pub hour: u32,
    pub minute: u32,
}

impl CivilTime {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)
    }
}

/// Resolves instants into local civil time at a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    /// Create a clock for an offset given in minutes east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            CoreError::InvalidConfig(format!("utc offset out of range: {minutes} minutes"))
        })?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current local civil time.
    pub fn now(&self) -> CivilTime {
        self.at(Utc::now())
    }

    /// Local civil time at `instant`.
    pub fn at(&self, instant: DateTime<Utc>) -> CivilTime {
        let local = instant.with_timezone(&self.offset);
        CivilTime {
            instant,
            date: CivilDate::from_gregorian(local.date_naive()),
            hour: local.hour(),
            minute: local.minute(),
        }
    }

    /// Civil time for local wall-clock fields.
    ///
    /// Returns `None` for an impossible date or time.
    pub fn local(&self, year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<CivilTime> {
        let local = self
            .offset
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()?;
        Some(self.at(local.with_timezone(&Utc)))
    }
}

impl Default for CivilClock {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}
