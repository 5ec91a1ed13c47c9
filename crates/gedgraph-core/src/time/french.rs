//! French Republican calendar
//!
//! Twelve 30-day months followed by the complementary days (`COMP`), five
//! in common years and six in the leap years III, VII and XI. The calendar
//! ran from 22 Sep 1792 until 31 Dec 1805 (Gregorian); dates outside that
//! window are rejected.

use crate::errors::{GedcomError, Result};
use crate::time::calendar::{check_day_month, Calendar, CalendarKind};

const MONTHS: [&str; 13] = [
    "VEND", "BRUM", "FRIM", "NIVO", "PLUV", "VENT", "GERM", "FLOR", "PRAI", "MESS", "THER",
    "FRUC", "COMP",
];

const LEAP_YEARS: [i32; 3] = [3, 7, 11];

/// Julian day of 1 VEND An I (22 Sep 1792 Gregorian)
pub const EPOCH_JDN: i64 = 2_375_840;

/// First Julian day after the calendar was abolished (1 Jan 1806 Gregorian)
pub const END_JDN: i64 = 2_380_688;

/// Last year with at least one valid day (An XIV)
const LAST_YEAR: i32 = 14;

const ROMAN: [&str; 14] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV",
];

/// French Republican calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct FrenchRepublican;

fn out_of_range(jdn: i64) -> GedcomError {
    GedcomError::UnsupportedRange {
        calendar: CalendarKind::FrenchRepublican,
        jdn,
    }
}

/// Julian day of 1 VEND of `year`
fn year_start(year: i32) -> i64 {
    let leaps_before = LEAP_YEARS.iter().filter(|leap| **leap < year).count() as i64;
    EPOCH_JDN + 365 * i64::from(year - 1) + leaps_before
}

impl Calendar for FrenchRepublican {
    fn kind(&self) -> CalendarKind {
        CalendarKind::FrenchRepublican
    }

    fn escape(&self) -> &'static str {
        "@#DFRENCH R@"
    }

    fn months(&self) -> &'static [&'static str] {
        &MONTHS
    }

    fn is_leap_year(&self, year: i32) -> bool {
        LEAP_YEARS.contains(&year)
    }

    fn days_in_month(&self, month: u8, year: i32) -> u8 {
        match month {
            1..=12 => 30,
            13 if self.is_leap_year(year) => 6,
            13 => 5,
            _ => 0,
        }
    }

    fn julian_day(&self, day: u8, month: u8, year: i32) -> Result<i64> {
        check_day_month(self, day, month, year)?;
        if !(1..=LAST_YEAR).contains(&year) {
            return Err(GedcomError::InvalidDate {
                reason: format!("French Republican year {} is out of range", year),
            });
        }
        let jdn = year_start(year) + 30 * i64::from(month - 1) + i64::from(day) - 1;
        if jdn >= END_JDN {
            return Err(out_of_range(jdn));
        }
        Ok(jdn)
    }

    fn date_of(&self, jdn: i64) -> Result<(u8, u8, i32)> {
        if !(EPOCH_JDN..END_JDN).contains(&jdn) {
            return Err(out_of_range(jdn));
        }
        let mut year = 1;
        while year < LAST_YEAR && year_start(year + 1) <= jdn {
            year += 1;
        }
        let offset = jdn - year_start(year);
        let month = (offset / 30) as u8 + 1;
        let day = (offset % 30) as u8 + 1;
        Ok((day, month, year))
    }

    fn display_year(&self, year: i32) -> String {
        match usize::try_from(year) {
            Ok(index) if (1..=ROMAN.len()).contains(&index) => format!("An {}", ROMAN[index - 1]),
            _ => year.to_string(),
        }
    }
}
