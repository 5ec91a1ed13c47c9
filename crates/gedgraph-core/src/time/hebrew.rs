//! Hebrew (lunisolar) calendar
//!
//! Years follow the 19-year metonic cycle; the start of each year is the
//! molad of Tishri with the standard postponement rules. Month slot 6
//! (`ADR`, Adar I) exists only in leap years; `ADS` is present every year.

use crate::errors::{GedcomError, Result};
use crate::time::calendar::{check_day_month, Calendar, CalendarKind, MAX_JDN};

const MONTHS: [&str; 13] = [
    "TSH", "CSH", "KSL", "TVT", "SHV", "ADR", "ADS", "NSN", "IYR", "SVN", "TMZ", "AAV", "ELL",
];

const CHESHVAN: u8 = 2;
const KISLEV: u8 = 3;
const ADAR_I: u8 = 6;

/// Julian day of 1 Tishri AM 1
pub const EPOCH_JDN: i64 = 347_998;

/// Hebrew calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct Hebrew;

/// Days from the epoch to the (unpostponed) new year of `year`
fn elapsed_days(year: i64) -> i64 {
    let months = (235 * year - 234).div_euclid(19);
    let parts = 12_084 + 13_753 * months;
    let day = months * 29 + parts.div_euclid(25_920);
    if (3 * (day + 1)).rem_euclid(7) < 3 {
        day + 1
    } else {
        day
    }
}

/// Julian day of 1 Tishri of `year`
fn new_year(year: i64) -> i64 {
    let current = elapsed_days(year);
    let adjustment = if elapsed_days(year + 1) - current == 356 {
        2
    } else if current - elapsed_days(year - 1) == 382 {
        1
    } else {
        0
    };
    EPOCH_JDN + current + adjustment
}

fn year_length(year: i32) -> i64 {
    new_year(i64::from(year) + 1) - new_year(i64::from(year))
}

fn out_of_range(jdn: i64) -> GedcomError {
    GedcomError::UnsupportedRange {
        calendar: CalendarKind::Hebrew,
        jdn,
    }
}

impl Calendar for Hebrew {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Hebrew
    }

    fn escape(&self) -> &'static str {
        "@#DHEBREW@"
    }

    fn months(&self) -> &'static [&'static str] {
        &MONTHS
    }

    fn is_leap_year(&self, year: i32) -> bool {
        (7 * i64::from(year) + 1).rem_euclid(19) < 7
    }

    fn days_in_month(&self, month: u8, year: i32) -> u8 {
        match month {
            CHESHVAN => {
                if year_length(year) % 10 == 5 {
                    30
                } else {
                    29
                }
            }
            KISLEV => {
                if year_length(year) % 10 == 3 {
                    29
                } else {
                    30
                }
            }
            ADAR_I => {
                if self.is_leap_year(year) {
                    30
                } else {
                    0
                }
            }
            // TVT ADS IYR TMZ ELL
            4 | 7 | 9 | 11 | 13 => 29,
            1 | 5 | 8 | 10 | 12 => 30,
            _ => 0,
        }
    }

    fn julian_day(&self, day: u8, month: u8, year: i32) -> Result<i64> {
        if year < 1 {
            return Err(GedcomError::InvalidDate {
                reason: format!("Hebrew year {} precedes the epoch", year),
            });
        }
        check_day_month(self, day, month, year)?;
        let preceding: i64 = (1..month)
            .map(|m| i64::from(self.days_in_month(m, year)))
            .sum();
        Ok(new_year(i64::from(year)) + preceding + i64::from(day) - 1)
    }

    fn date_of(&self, jdn: i64) -> Result<(u8, u8, i32)> {
        if !(EPOCH_JDN..=MAX_JDN).contains(&jdn) {
            return Err(out_of_range(jdn));
        }
        // Mean year is 35975351/98496 days; refine the estimate both ways
        let mut year = ((jdn - EPOCH_JDN) * 98_496).div_euclid(35_975_351) + 1;
        while new_year(year + 1) <= jdn {
            year += 1;
        }
        while year > 1 && new_year(year) > jdn {
            year -= 1;
        }
        let year = i32::try_from(year).map_err(|_| out_of_range(jdn))?;

        let mut remaining = jdn - new_year(i64::from(year));
        let mut month = 1u8;
        while remaining >= i64::from(self.days_in_month(month, year)) {
            remaining -= i64::from(self.days_in_month(month, year));
            month += 1;
        }
        Ok((remaining as u8 + 1, month, year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_years_follow_metonic_cycle() {
        assert!(Hebrew.is_leap_year(5760));
        assert!(!Hebrew.is_leap_year(5761));
        assert!(Hebrew.is_leap_year(5784));
        let leaps = (1..=19).filter(|y| Hebrew.is_leap_year(*y)).count();
        assert_eq!(leaps, 7);
    }

    #[test]
    fn test_year_lengths() {
        assert_eq!(year_length(5760), 385);
        assert_eq!(year_length(5761), 353);
        assert_eq!(year_length(5784), 383);
        assert_eq!(year_length(5785), 355);
    }

    #[test]
    fn test_month_lengths_sum_to_year_length() {
        for year in [5760, 5761, 5784, 5785] {
            let total: i64 = (1..=13)
                .map(|m| i64::from(Hebrew.days_in_month(m, year)))
                .sum();
            assert_eq!(total, year_length(year), "year {}", year);
        }
    }

    #[test]
    fn test_adar_one_only_in_leap_years() {
        assert_eq!(Hebrew.days_in_month(ADAR_I, 5761), 0);
        assert_eq!(Hebrew.days_in_month(ADAR_I, 5760), 30);
        assert!(matches!(
            Hebrew.julian_day(1, ADAR_I, 5761),
            Err(GedcomError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_new_year_5760() {
        // 1 Tishri 5760 was 11 Sep 1999
        assert_eq!(new_year(5760), 2_451_433);
    }

    #[test]
    fn test_first_of_january_2000() {
        assert_eq!(Hebrew.date_of(2_451_545).unwrap(), (23, 4, 5760));
        assert_eq!(Hebrew.julian_day(23, 4, 5760).unwrap(), 2_451_545);
    }

    #[test]
    fn test_epoch_boundary() {
        assert_eq!(Hebrew.date_of(EPOCH_JDN).unwrap(), (1, 1, 1));
        assert!(matches!(
            Hebrew.date_of(EPOCH_JDN - 1),
            Err(GedcomError::UnsupportedRange { .. })
        ));
    }

    #[test]
    fn test_huge_day_numbers_are_unsupported() {
        for jdn in [1_000_000_000_000, MAX_JDN, MAX_JDN + 1, i64::MAX / 2, i64::MAX] {
            assert!(matches!(
                Hebrew.date_of(jdn),
                Err(GedcomError::UnsupportedRange { .. })
            ));
        }
    }
}
