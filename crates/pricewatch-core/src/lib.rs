//! Core domain types for the pricewatch daemon.
//!
//! This crate provides the types every other component speaks:
//! - `Price`: exact decimal price newtype
//! - `Symbol`, `Quote`, `Snapshot`: the closed set of tracked instruments
//!   and one fetched observation of all of them
//! - `CivilClock`, `CivilTime`, `CivilDate`: local civil time, including
//!   the Jalali calendar view of a date
//! - `HolidayCalendar`: rest day, fixed-date holidays and exceptions
//! - `SessionWindow`: the daily notification session gate

pub mod calendar;
pub mod decimal;
pub mod error;
pub mod holiday;
pub mod quote;
pub mod session;

pub use calendar::{CalendarSystem, CivilClock, CivilDate, CivilTime, JalaliDate};
pub use decimal::Price;
pub use error::{CoreError, Result};
pub use holiday::{DayKind, HolidayCalendar, HolidayEntry, MonthDay};
pub use quote::{Quote, Snapshot, Symbol};
pub use session::{SessionPhase, SessionWindow};
