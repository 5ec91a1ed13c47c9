//! Gregorian and proleptic Julian calendars
//!
//! Both use the Fliegel–Van Flandern integer formulas. Negative years are
//! BC years (there is no year zero); internally they are shifted to
//! astronomical numbering.

use crate::errors::{GedcomError, Result};
use crate::time::calendar::{check_day_month, Calendar, CalendarKind, MAX_JDN};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const MONTH_LENGTHS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian calendar (proleptic before 1582)
#[derive(Debug, Clone, Copy, Default)]
pub struct Gregorian;

/// Julian calendar (proleptic)
#[derive(Debug, Clone, Copy, Default)]
pub struct Julian;

fn astronomical(year: i32) -> i64 {
    if year < 0 {
        i64::from(year) + 1
    } else {
        i64::from(year)
    }
}

fn historical(year: i64) -> Option<i32> {
    let year = if year <= 0 { year - 1 } else { year };
    i32::try_from(year).ok()
}

/// Shared shift of the year to start in March
fn march_based(month: u8, year: i32) -> (i64, i64) {
    let a = (14 - i64::from(month)).div_euclid(12);
    let y = astronomical(year) + 4800 - a;
    let m = i64::from(month) + 12 * a - 3;
    (y, m)
}

fn month_length(month: u8, leap: bool) -> u8 {
    match month {
        2 if leap => 29,
        1..=12 => MONTH_LENGTHS[month as usize - 1],
        _ => 0,
    }
}

/// Finish the inverse conversion from the day count inside a 4-year cycle
///
/// `None` when the year does not fit an `i32`.
fn split_cycle(c: i64, centuries: i64) -> Option<(u8, u8, i32)> {
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);
    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = 100 * centuries + d - 4800 + m.div_euclid(10);
    Some((day as u8, month as u8, historical(year)?))
}

fn out_of_range(kind: CalendarKind, jdn: i64) -> GedcomError {
    GedcomError::UnsupportedRange {
        calendar: kind,
        jdn,
    }
}

impl Calendar for Gregorian {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Gregorian
    }

    fn escape(&self) -> &'static str {
        "@#DGREGORIAN@"
    }

    fn months(&self) -> &'static [&'static str] {
        &MONTHS
    }

    fn is_leap_year(&self, year: i32) -> bool {
        let year = astronomical(year);
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    fn days_in_month(&self, month: u8, year: i32) -> u8 {
        month_length(month, self.is_leap_year(year))
    }

    fn julian_day(&self, day: u8, month: u8, year: i32) -> Result<i64> {
        check_day_month(self, day, month, year)?;
        let (y, m) = march_based(month, year);
        let jdn = i64::from(day) + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4)
            - y.div_euclid(100)
            + y.div_euclid(400)
            - 32045;
        if jdn < 0 {
            return Err(out_of_range(self.kind(), jdn));
        }
        Ok(jdn)
    }

    fn date_of(&self, jdn: i64) -> Result<(u8, u8, i32)> {
        if !(0..=MAX_JDN).contains(&jdn) {
            return Err(out_of_range(self.kind(), jdn));
        }
        let a = jdn + 32044;
        let b = (4 * a + 3).div_euclid(146_097);
        let c = a - (146_097 * b).div_euclid(4);
        split_cycle(c, b).ok_or_else(|| out_of_range(self.kind(), jdn))
    }
}

impl Calendar for Julian {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Julian
    }

    fn escape(&self) -> &'static str {
        "@#DJULIAN@"
    }

    fn months(&self) -> &'static [&'static str] {
        &MONTHS
    }

    fn is_leap_year(&self, year: i32) -> bool {
        astronomical(year) % 4 == 0
    }

    fn days_in_month(&self, month: u8, year: i32) -> u8 {
        month_length(month, self.is_leap_year(year))
    }

    fn julian_day(&self, day: u8, month: u8, year: i32) -> Result<i64> {
        check_day_month(self, day, month, year)?;
        let (y, m) = march_based(month, year);
        let jdn = i64::from(day) + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - 32083;
        if jdn < 0 {
            return Err(out_of_range(self.kind(), jdn));
        }
        Ok(jdn)
    }

    fn date_of(&self, jdn: i64) -> Result<(u8, u8, i32)> {
        if !(0..=MAX_JDN).contains(&jdn) {
            return Err(out_of_range(self.kind(), jdn));
        }
        split_cycle(jdn + 32082, 0).ok_or_else(|| out_of_range(self.kind(), jdn))
    }
}
