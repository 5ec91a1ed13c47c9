//! Calendar engine
//!
//! Conversion between `(day, month, year)` tuples in the Gregorian, Julian,
//! Hebrew and French Republican calendars and an absolute Julian Day Number,
//! plus calendar-aware age arithmetic.
//!
//! Day and month numbers are 1-based. A point in time may be partial
//! (year only, or month and year); partial points resolve to the first day
//! of the period they name.

pub mod calendar;
pub mod delta;
pub mod french;
pub mod gregorian;
pub mod hebrew;
pub mod point_in_time;

pub use calendar::{Calendar, CalendarKind};
pub use delta::Delta;
pub use point_in_time::PointInTime;

/// Julian day of the Unix epoch (1 Jan 1970 Gregorian)
pub const UNIX_EPOCH_JDN: i64 = 2_440_588;
