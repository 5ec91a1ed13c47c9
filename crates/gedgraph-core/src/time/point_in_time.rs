use std::cmp::Ordering;
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::errors::{GedcomError, Result};
use crate::time::{CalendarKind, UNIX_EPOCH_JDN};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A possibly partial date in one calendar
///
/// Components are 1-based. Equality is structural; chronological
/// comparison is only defined when both points resolve to a Julian Day
/// Number, see [`PointInTime::compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointInTime {
    day: Option<u8>,
    month: Option<u8>,
    year: Option<i32>,
    calendar: CalendarKind,
}

impl PointInTime {
    pub fn new(day: Option<u8>, month: Option<u8>, year: Option<i32>, calendar: CalendarKind) -> Self {
        Self {
            day,
            month,
            year,
            calendar,
        }
    }

    /// Complete Gregorian date
    pub fn gregorian(day: u8, month: u8, year: i32) -> Self {
        Self::new(Some(day), Some(month), Some(year), CalendarKind::Gregorian)
    }

    /// Today's date (UTC) in the Gregorian calendar
    pub fn today() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self::gregorian(today.day() as u8, today.month() as u8, today.year())
    }

    pub fn day(&self) -> Option<u8> {
        self.day
    }

    pub fn month(&self) -> Option<u8> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn calendar(&self) -> CalendarKind {
        self.calendar
    }

    /// Whether day, month and year are all known
    pub fn is_complete(&self) -> bool {
        self.day.is_some() && self.month.is_some() && self.year.is_some()
    }

    /// Whether the point resolves to a Julian Day Number
    pub fn is_valid(&self) -> bool {
        self.julian_day().is_ok()
    }

    /// Julian Day Number of this point (first day of a partial period)
    ///
    /// # Errors
    ///
    /// See [`CalendarKind::to_julian_day`].
    pub fn julian_day(&self) -> Result<i64> {
        self.calendar.to_julian_day(self)
    }

    /// The same day expressed in another calendar
    ///
    /// A partial point keeps its precision when the target calendar is the
    /// same; otherwise the converted point is complete.
    ///
    /// # Errors
    ///
    /// Returns the conversion error of either calendar.
    pub fn to_calendar(&self, calendar: CalendarKind) -> Result<PointInTime> {
        if calendar == self.calendar {
            self.julian_day()?;
            return Ok(*self);
        }
        calendar.from_julian_day(self.julian_day()?)
    }

    /// Chronological comparison; `None` unless both points are valid
    pub fn compare(&self, other: &PointInTime) -> Option<Ordering> {
        let left = self.julian_day().ok()?;
        let right = other.julian_day().ok()?;
        Some(left.cmp(&right))
    }

    /// Milliseconds since the Unix epoch at midnight UTC of this day
    ///
    /// # Errors
    ///
    /// See [`PointInTime::julian_day`]; `UnsupportedRange` when the result
    /// does not fit an `i64`.
    pub fn to_unix_millis(&self) -> Result<i64> {
        let jdn = self.julian_day()?;
        (jdn - UNIX_EPOCH_JDN)
            .checked_mul(MILLIS_PER_DAY)
            .ok_or(GedcomError::UnsupportedRange {
                calendar: self.calendar,
                jdn,
            })
    }

    /// Gregorian day containing the given Unix timestamp
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRange` before JDN 0.
    pub fn from_unix_millis(millis: i64) -> Result<PointInTime> {
        let jdn = UNIX_EPOCH_JDN + millis.div_euclid(MILLIS_PER_DAY);
        CalendarKind::Gregorian.from_julian_day(jdn)
    }

    /// Parse GEDCOM date text
    ///
    /// Accepts an optional calendar escape followed by `YYYY`, `MMM YYYY`
    /// or `DD MMM YYYY`. Month names are matched case-insensitively against
    /// the chosen calendar.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` for anything else, including dates that do not
    /// resolve to a Julian Day Number.
    pub fn parse(text: &str) -> Result<PointInTime> {
        let invalid = |reason: &str| GedcomError::InvalidDate {
            reason: format!("'{}': {}", text.trim(), reason),
        };

        let mut rest = text.trim();
        let mut calendar = CalendarKind::Gregorian;
        if rest.starts_with("@#") {
            let end = rest[2..]
                .find('@')
                .map(|i| i + 3)
                .ok_or_else(|| invalid("unterminated calendar escape"))?;
            calendar = CalendarKind::from_escape(&rest[..end])
                .ok_or_else(|| invalid("unknown calendar escape"))?;
            rest = rest[end..].trim_start();
        }

        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let cal = calendar.calendar();
        let parse_year = |token: &str| token.parse::<i32>().map_err(|_| invalid("bad year"));
        let parse_month = |token: &str| cal.parse_month(token).ok_or_else(|| invalid("bad month"));
        let pit = match tokens.as_slice() {
            [year] => PointInTime::new(None, None, Some(parse_year(*year)?), calendar),
            [month, year] => PointInTime::new(
                None,
                Some(parse_month(*month)?),
                Some(parse_year(*year)?),
                calendar,
            ),
            [day, month, year] => {
                let day = day.parse::<u8>().map_err(|_| invalid("bad day"))?;
                PointInTime::new(
                    Some(day),
                    Some(parse_month(*month)?),
                    Some(parse_year(*year)?),
                    calendar,
                )
            }
            _ => return Err(invalid("expected [DD] [MMM] YYYY")),
        };
        pit.julian_day()?;
        Ok(pit)
    }

    /// Human-readable form using the calendar's year label
    pub fn describe(&self) -> String {
        let cal = self.calendar.calendar();
        let mut parts = Vec::with_capacity(3);
        if let Some(day) = self.day {
            parts.push(day.to_string());
        }
        if let Some(name) = self.month.and_then(|m| cal.month_name(m)) {
            parts.push(name.to_string());
        }
        if let Some(year) = self.year {
            parts.push(cal.display_year(year));
        }
        parts.join(" ")
    }
}

impl fmt::Display for PointInTime {
    /// GEDCOM text, with the calendar escape for non-Gregorian dates
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cal = self.calendar.calendar();
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if self.calendar != CalendarKind::Gregorian {
            parts.push(cal.escape().to_string());
        }
        if let Some(day) = self.day {
            parts.push(day.to_string());
        }
        if let Some(name) = self.month.and_then(|m| cal.month_name(m)) {
            parts.push(name.to_string());
        }
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        f.write_str(&parts.join(" "))
    }
}
