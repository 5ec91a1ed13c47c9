use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{GedcomError, Result};
use crate::time::PointInTime;

/// Calendar-aware difference between two points in time
///
/// Month and year lengths come from the calendar of the points, so the
/// same number of days can yield different deltas in different calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Delta {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl Delta {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn from_years(years: u32) -> Self {
        Self::new(years, 0, 0)
    }

    /// Whether no time elapsed
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Difference between two points of the same calendar
    ///
    /// Returns `None` when either point is invalid or the calendars differ.
    /// Points given in reverse order are swapped. An unknown day or month
    /// counts as the first of its period. Identical days give a zero delta.
    pub fn between(earlier: &PointInTime, later: &PointInTime) -> Option<Delta> {
        if earlier.calendar() != later.calendar() {
            return None;
        }
        let (earlier, later) = match earlier.compare(later)? {
            Ordering::Greater => (later, earlier),
            _ => (earlier, later),
        };
        let calendar = earlier.calendar().calendar();

        let (y1, m1, d1) = components(earlier)?;
        let (y2, m2, d2) = components(later)?;

        let mut years = i64::from(y2) - i64::from(y1);
        let mut months = i64::from(m2) - i64::from(m1);
        let mut days = i64::from(d2) - i64::from(d1);

        if days < 0 {
            months -= 1;
            days = i64::from(d2) + i64::from(calendar.days_in_month(m1, y1)) - i64::from(d1);
        }
        if months < 0 {
            years -= 1;
            months += i64::from(calendar.months_in_year());
        }
        if years < 0 || months < 0 || days < 0 {
            return None;
        }
        Some(Delta::new(
            u32::try_from(years).ok()?,
            u32::try_from(months).ok()?,
            u32::try_from(days).ok()?,
        ))
    }

    /// Parse a GEDCOM age value such as `10y 2m 3d`
    ///
    /// Components may appear in any order; each is a number followed by
    /// `y`, `m` or `d`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAge` for any other token.
    pub fn parse(text: &str) -> Result<Delta> {
        let invalid = || GedcomError::InvalidAge {
            text: text.to_string(),
        };
        let mut delta = Delta::default();
        let mut seen = false;
        for token in text.split_whitespace() {
            let unit_start = token.char_indices().last().map_or(0, |(i, _)| i);
            let (digits, unit) = token.split_at(unit_start);
            let value: u32 = digits.parse().map_err(|_| invalid())?;
            match unit.to_ascii_lowercase().as_str() {
                "y" => delta.years = value,
                "m" => delta.months = value,
                "d" => delta.days = value,
                _ => return Err(invalid()),
            }
            seen = true;
        }
        if !seen {
            return Err(invalid());
        }
        Ok(delta)
    }

    /// GEDCOM age value (`10y 2m`); empty for a zero delta
    pub fn to_gedcom_value(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.years > 0 {
            parts.push(format!("{}y", self.years));
        }
        if self.months > 0 {
            parts.push(format!("{}m", self.months));
        }
        if self.days > 0 {
            parts.push(format!("{}d", self.days));
        }
        parts.join(" ")
    }
}

/// `(year, month, day)` with unknown parts treated as the first
fn components(pit: &PointInTime) -> Option<(i32, u8, u8)> {
    Some((pit.year()?, pit.month().unwrap_or(1), pit.day().unwrap_or(1)))
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("<1 day");
        }
        f.write_str(&self.to_gedcom_value())
    }
}
