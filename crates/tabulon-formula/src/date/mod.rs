//! Date serial arithmetic
//!
//! Dates are Excel serial numbers in the 1900 date system: serial 1 is 1900-01-01 and the
//! integer part counts days. The system keeps the historical "1900 leap year" bug, so
//! serial 60 is the non-existent 1900-02-29. [`SimpleDate`] can represent that day, which
//! keeps serial -> calendar -> serial conversions lossless.

pub mod parser;
pub mod workday;
pub mod yearfrac;

pub use parser::parse_date;
pub use workday::{WeekendPattern, WorkdayCalculator};
pub use yearfrac::YearFracCalculator;

use crate::error::EvalResult;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tabulon_core::CellError;

/// Serial of 9999-12-31, the last date Excel can represent
pub const MAX_SERIAL: i64 = 2_958_465;

/// Serial of the fictitious 1900-02-29
const LEAP_BUG_SERIAL: i64 = 60;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0) && ((year % 100 != 0) || (year % 400 == 0))
}

/// Number of days in a month of the proleptic Gregorian calendar
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A calendar date as the 1900 date system sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimpleDate {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    /// 1-based day of month
    pub day: u32,
}

impl SimpleDate {
    /// Create a date, checking month and day bounds (1900-02-29 is accepted)
    pub fn new(year: i32, month: u32, day: u32) -> EvalResult<Self> {
        if !(1..=12).contains(&month) || day < 1 {
            return Err(CellError::Value);
        }
        let max_day = if year == 1900 && month == 2 {
            29
        } else {
            days_in_month(year, month)
        };
        if day > max_day {
            return Err(CellError::Value);
        }
        Ok(Self { year, month, day })
    }

    /// Convert a serial to a calendar date, ignoring any time-of-day fraction
    pub fn from_serial(serial: f64) -> EvalResult<Self> {
        if !serial.is_finite() {
            return Err(CellError::Num);
        }
        let whole = serial.floor() as i64;
        if !(0..=MAX_SERIAL).contains(&whole) {
            return Err(CellError::Num);
        }
        if whole == LEAP_BUG_SERIAL {
            return Ok(Self {
                year: 1900,
                month: 2,
                day: 29,
            });
        }
        let adjusted = if whole > LEAP_BUG_SERIAL {
            whole - 1
        } else {
            whole
        };
        let date = epoch()
            .checked_add_signed(Duration::days(adjusted))
            .ok_or(CellError::Num)?;
        Ok(Self::from(date))
    }

    /// Serial number of this date
    pub fn to_serial(&self) -> i64 {
        if self.year == 1900 && self.month == 2 && self.day == 29 {
            return LEAP_BUG_SERIAL;
        }
        let days = match NaiveDate::from_ymd_opt(self.year, self.month, self.day) {
            Some(date) => (date - epoch()).num_days(),
            None => return 0,
        };
        if days >= LEAP_BUG_SERIAL {
            days + 1
        } else {
            days
        }
    }

    /// Real calendar date; the fictitious 1900-02-29 maps to 1900-03-01
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .or_else(|| NaiveDate::from_ymd_opt(self.year, self.month + 1, 1))
    }

    pub fn is_last_day_of_month(&self) -> bool {
        if self.year == 1900 && self.month == 2 {
            return self.day == 29;
        }
        self.day == days_in_month(self.year, self.month)
    }

    /// Move by whole months, clamping the day to the end of the target month
    pub fn add_months(&self, months: i32) -> EvalResult<Self> {
        let total = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        let year = i32::try_from(total.div_euclid(12)).map_err(|_| CellError::Num)?;
        let month = total.rem_euclid(12) as u32 + 1;
        if !(1900..=9999).contains(&year) {
            return Err(CellError::Num);
        }
        let day = self.day.min(days_in_month(year, month));
        Ok(Self { year, month, day })
    }

    pub fn end_of_month(&self) -> Self {
        let day = if self.year == 1900 && self.month == 2 {
            29
        } else {
            days_in_month(self.year, self.month)
        };
        Self {
            year: self.year,
            month: self.month,
            day,
        }
    }
}

impl From<NaiveDate> for SimpleDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Day of week for a serial, the way Excel numbers it
///
/// Serial 1 is a Sunday in the 1900 system (it was really a Monday; the leap-year bug
/// shifts every date before March 1900 by one day).
pub fn weekday(serial: f64) -> Weekday {
    match (serial.floor() as i64 - 1).rem_euclid(7) {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Check a serial is a representable date and return its whole-day part
pub fn checked_serial(serial: f64) -> EvalResult<f64> {
    let whole = serial.floor();
    if !whole.is_finite() || whole < 0.0 || whole > MAX_SERIAL as f64 {
        return Err(CellError::Num);
    }
    Ok(whole)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_serials() {
        assert_eq!(SimpleDate::new(1900, 1, 1).unwrap().to_serial(), 1);
        assert_eq!(SimpleDate::new(1900, 2, 28).unwrap().to_serial(), 59);
        assert_eq!(SimpleDate::new(1900, 2, 29).unwrap().to_serial(), 60);
        assert_eq!(SimpleDate::new(1900, 3, 1).unwrap().to_serial(), 61);
        assert_eq!(SimpleDate::new(2000, 1, 1).unwrap().to_serial(), 36526);
        assert_eq!(SimpleDate::new(9999, 12, 31).unwrap().to_serial(), MAX_SERIAL);
    }

    #[test]
    fn test_serial_roundtrip() {
        let samples = (1..200)
            .chain(36_000..37_500)
            .chain(MAX_SERIAL - 400..=MAX_SERIAL);
        for serial in samples {
            let date = SimpleDate::from_serial(serial as f64).unwrap();
            assert_eq!(date.to_serial(), serial, "serial {serial} -> {date:?}");
        }
    }

    #[test]
    fn test_from_serial_drops_time_and_rejects_range() {
        let d = SimpleDate::from_serial(36526.75).unwrap();
        assert_eq!((d.year, d.month, d.day), (2000, 1, 1));
        assert_eq!(SimpleDate::from_serial(-1.0), Err(CellError::Num));
        assert_eq!(
            SimpleDate::from_serial(MAX_SERIAL as f64 + 1.0),
            Err(CellError::Num)
        );
    }

    #[test]
    fn test_weekday() {
        // 2024-01-01 was a Monday
        let serial = SimpleDate::new(2024, 1, 1).unwrap().to_serial() as f64;
        assert_eq!(weekday(serial), Weekday::Mon);
        assert_eq!(weekday(serial + 5.0), Weekday::Sat);
        assert_eq!(weekday(1.0), Weekday::Sun);
    }

    #[test]
    fn test_add_months_clamps() {
        let jan31 = SimpleDate::new(2023, 1, 31).unwrap();
        assert_eq!(jan31.add_months(1).unwrap(), SimpleDate::new(2023, 2, 28).unwrap());
        assert_eq!(jan31.add_months(13).unwrap(), SimpleDate::new(2024, 2, 29).unwrap());
        assert_eq!(jan31.add_months(-2).unwrap(), SimpleDate::new(2022, 11, 30).unwrap());
        assert_eq!(
            SimpleDate::new(1900, 1, 15).unwrap().add_months(-1),
            Err(CellError::Num)
        );
    }

    #[test]
    fn test_last_day_of_month() {
        assert!(SimpleDate::new(2024, 2, 29).unwrap().is_last_day_of_month());
        assert_eq!(
            SimpleDate::new(2023, 2, 3).unwrap().end_of_month(),
            SimpleDate::new(2023, 2, 28).unwrap()
        );
        assert_eq!(
            SimpleDate::new(1900, 2, 3).unwrap().end_of_month().to_serial(),
            60
        );
        assert!(SimpleDate::new(1900, 2, 29).unwrap().is_last_day_of_month());
        assert!(SimpleDate::new(1900, 2, 30).is_err());
    }
}
