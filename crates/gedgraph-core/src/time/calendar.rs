use serde::{Deserialize, Serialize};

use crate::errors::{GedcomError, Result};
use crate::time::french::FrenchRepublican;
use crate::time::gregorian::{Gregorian, Julian};
use crate::time::hebrew::Hebrew;
use crate::time::PointInTime;

/// Ceiling on day numbers accepted by `date_of`
///
/// Lies past the last day of year `i32::MAX` in every calendar and keeps the
/// inverse formulas inside `i64`.
pub const MAX_JDN: i64 = 1 << 40;

/// The calendars a point in time can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalendarKind {
    Gregorian,
    Julian,
    Hebrew,
    FrenchRepublican,
}

impl CalendarKind {
    /// All calendar kinds in escape-lookup order
    pub const ALL: [CalendarKind; 4] = [
        CalendarKind::Gregorian,
        CalendarKind::Julian,
        CalendarKind::Hebrew,
        CalendarKind::FrenchRepublican,
    ];

    /// The calendar implementation for this kind
    pub fn calendar(self) -> &'static dyn Calendar {
        match self {
            CalendarKind::Gregorian => &Gregorian,
            CalendarKind::Julian => &Julian,
            CalendarKind::Hebrew => &Hebrew,
            CalendarKind::FrenchRepublican => &FrenchRepublican,
        }
    }

    /// Find the calendar whose GEDCOM escape is `escape` (case-insensitive)
    pub fn from_escape(escape: &str) -> Option<CalendarKind> {
        CalendarKind::ALL
            .into_iter()
            .find(|kind| kind.calendar().escape().eq_ignore_ascii_case(escape))
    }

    /// Convert a complete or partial point to its Julian Day Number
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` for a missing or zero year, a day without a
    /// month, or a month/day outside this calendar's range, and
    /// `UnsupportedRange` for dates the calendar cannot express.
    pub fn to_julian_day(self, pit: &PointInTime) -> Result<i64> {
        let calendar = self.calendar();
        let year = match pit.year() {
            Some(year) if year != 0 => year,
            _ => {
                return Err(GedcomError::InvalidDate {
                    reason: "year is missing or zero".to_string(),
                })
            }
        };
        match (pit.month(), pit.day()) {
            (None, Some(_)) => Err(GedcomError::InvalidDate {
                reason: "day given without a month".to_string(),
            }),
            (None, None) => calendar.julian_day(1, first_month(calendar, year), year),
            (Some(month), None) => calendar.julian_day(1, month, year),
            (Some(month), Some(day)) => calendar.julian_day(day, month, year),
        }
    }

    /// Convert a Julian Day Number into a complete point in this calendar
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRange` when the day lies outside the interval
    /// the calendar supports.
    pub fn from_julian_day(self, jdn: i64) -> Result<PointInTime> {
        let (day, month, year) = self.calendar().date_of(jdn)?;
        Ok(PointInTime::new(Some(day), Some(month), Some(year), self))
    }
}

/// First month that exists in `year` (skips leap-only months)
fn first_month(calendar: &dyn Calendar, year: i32) -> u8 {
    (1..=calendar.months().len() as u8)
        .find(|month| calendar.days_in_month(*month, year) > 0)
        .unwrap_or(1)
}

impl std::fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CalendarKind::Gregorian => "Gregorian",
            CalendarKind::Julian => "Julian",
            CalendarKind::Hebrew => "Hebrew",
            CalendarKind::FrenchRepublican => "French Republican",
        };
        f.write_str(name)
    }
}

/// Calendar arithmetic
///
/// Implementations are zero-sized types. Months and days are 1-based.
pub trait Calendar: Send + Sync {
    /// Kind tag of this calendar
    fn kind(&self) -> CalendarKind;

    /// GEDCOM escape preceding dates in this calendar
    fn escape(&self) -> &'static str;

    /// Upper-case GEDCOM month abbreviations in calendar order
    fn months(&self) -> &'static [&'static str];

    /// Whether `year` is a leap year
    fn is_leap_year(&self, year: i32) -> bool;

    /// Days in `month` of `year`; zero for a month the year does not have
    fn days_in_month(&self, month: u8, year: i32) -> u8;

    /// Julian Day Number of a complete date
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` or `UnsupportedRange` when the date is out of
    /// domain.
    fn julian_day(&self, day: u8, month: u8, year: i32) -> Result<i64>;

    /// `(day, month, year)` of a Julian Day Number
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRange` outside the supported interval.
    fn date_of(&self, jdn: i64) -> Result<(u8, u8, i32)>;

    /// Number of months in the calendar (leap-only months included)
    fn months_in_year(&self) -> u8 {
        self.months().len() as u8
    }

    /// Month number for an abbreviation, case-insensitive
    fn parse_month(&self, text: &str) -> Option<u8> {
        self.months()
            .iter()
            .position(|name| name.eq_ignore_ascii_case(text))
            .map(|index| index as u8 + 1)
    }

    /// Abbreviation of a month number
    fn month_name(&self, month: u8) -> Option<&'static str> {
        month
            .checked_sub(1)
            .and_then(|index| self.months().get(index as usize))
            .copied()
    }

    /// Human-readable year label
    fn display_year(&self, year: i32) -> String {
        year.to_string()
    }
}

/// Range checks shared by every calendar
pub(crate) fn check_day_month(calendar: &dyn Calendar, day: u8, month: u8, year: i32) -> Result<()> {
    if year == 0 {
        return Err(GedcomError::InvalidDate {
            reason: "year zero does not exist".to_string(),
        });
    }
    if month == 0 || month > calendar.months_in_year() {
        return Err(GedcomError::InvalidDate {
            reason: format!("month {} is out of range", month),
        });
    }
    let length = calendar.days_in_month(month, year);
    if day == 0 || day > length {
        return Err(GedcomError::InvalidDate {
            reason: format!(
                "day {} is out of range for month {} of {} {}",
                day,
                calendar.month_name(month).unwrap_or("?"),
                calendar.kind(),
                year
            ),
        });
    }
    Ok(())
}
