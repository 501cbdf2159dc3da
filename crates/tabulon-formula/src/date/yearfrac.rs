//! YEARFRAC day-count conventions
//!
//! | basis | convention          |
//! |-------|---------------------|
//! | 0     | US (NASD) 30/360    |
//! | 1     | Actual/actual       |
//! | 2     | Actual/360          |
//! | 3     | Actual/365          |
//! | 4     | European 30/360     |

use super::{is_leap_year, SimpleDate};
use crate::error::EvalResult;
use tabulon_core::CellError;

const DAYS_PER_NORMAL_YEAR: f64 = 365.0;
const DAYS_PER_LEAP_YEAR: f64 = 366.0;
const LONG_MONTH_LEN: u32 = 31;
const SHORT_MONTH_LEN: u32 = 30;
const LONG_FEB_LEN: u32 = 29;

/// Computes the fraction of a year between two date serials
pub struct YearFracCalculator;

impl YearFracCalculator {
    /// Year fraction between `start` and `end` under `basis`
    ///
    /// Both serials are truncated to whole days and the order of the arguments does not
    /// matter. Equal dates give exactly `0`; a basis outside `0..=4` is `#NUM!`.
    pub fn calculate(start: f64, end: f64, basis: i32) -> EvalResult<f64> {
        if !(0..=4).contains(&basis) {
            return Err(CellError::Num);
        }

        let mut start = start.floor();
        let mut end = end.floor();
        if start == end {
            return Ok(0.0);
        }
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        match basis {
            0 => Self::basis0(start, end),
            1 => Self::basis1(start, end),
            2 => Ok((end - start) / 360.0),
            3 => Ok((end - start) / 365.0),
            _ => Self::basis4(start, end),
        }
    }

    /// US 30/360 with the end-of-month adjustments
    fn basis0(start: f64, end: f64) -> EvalResult<f64> {
        let start_date = SimpleDate::from_serial(start)?;
        let end_date = SimpleDate::from_serial(end)?;
        let mut day1 = start_date.day;
        let mut day2 = end_date.day;

        if day1 == LONG_MONTH_LEN && day2 == LONG_MONTH_LEN {
            day1 = SHORT_MONTH_LEN;
            day2 = SHORT_MONTH_LEN;
        } else if day1 == LONG_MONTH_LEN {
            day1 = SHORT_MONTH_LEN;
        } else if day1 == SHORT_MONTH_LEN && day2 == LONG_MONTH_LEN {
            // a 31st end date is kept when the start day is below 30
            day2 = SHORT_MONTH_LEN;
        } else if start_date.month == 2 && start_date.is_last_day_of_month() {
            // deliberately produces "February 30th"
            day1 = SHORT_MONTH_LEN;
            if end_date.month == 2 && end_date.is_last_day_of_month() {
                day2 = SHORT_MONTH_LEN;
            }
        }

        Ok(Self::adjusted_day_count(&start_date, &end_date, day1, day2) / 360.0)
    }

    /// Actual/actual: actual days over an averaged year length
    fn basis1(start: f64, end: f64) -> EvalResult<f64> {
        let start_date = SimpleDate::from_serial(start)?;
        let end_date = SimpleDate::from_serial(end)?;

        let year_length = if Self::is_greater_than_one_year(&start_date, &end_date) {
            Self::average_year_length(start_date.year, end_date.year)
        } else if Self::should_count_feb29(&start_date, &end_date) {
            DAYS_PER_LEAP_YEAR
        } else {
            DAYS_PER_NORMAL_YEAR
        };

        Ok((end - start) / year_length)
    }

    /// European 30/360: every 31st becomes the 30th, February is not special
    fn basis4(start: f64, end: f64) -> EvalResult<f64> {
        let start_date = SimpleDate::from_serial(start)?;
        let end_date = SimpleDate::from_serial(end)?;
        let day1 = start_date.day.min(SHORT_MONTH_LEN);
        let day2 = end_date.day.min(SHORT_MONTH_LEN);

        Ok(Self::adjusted_day_count(&start_date, &end_date, day1, day2) / 360.0)
    }

    fn adjusted_day_count(start: &SimpleDate, end: &SimpleDate, day1: u32, day2: u32) -> f64 {
        let years = (end.year - start.year) as f64;
        let months = end.month as f64 - start.month as f64;
        let days = day2 as f64 - day1 as f64;
        years * 360.0 + months * SHORT_MONTH_LEN as f64 + days
    }

    fn is_greater_than_one_year(start: &SimpleDate, end: &SimpleDate) -> bool {
        if start.year == end.year {
            return false;
        }
        if start.year + 1 != end.year {
            return true;
        }
        if start.month > end.month {
            return false;
        }
        if start.month < end.month {
            return true;
        }
        start.day < end.day
    }

    fn average_year_length(start_year: i32, end_year: i32) -> f64 {
        let day_count: f64 = (start_year..=end_year)
            .map(|year| {
                if is_leap_year(year) {
                    DAYS_PER_LEAP_YEAR
                } else {
                    DAYS_PER_NORMAL_YEAR
                }
            })
            .sum();
        day_count / (end_year - start_year + 1) as f64
    }

    /// Whether a span of at most one year is measured against a 366-day year
    fn should_count_feb29(start: &SimpleDate, end: &SimpleDate) -> bool {
        if is_leap_year(start.year) {
            if start.year == end.year {
                // counted even if the span does not actually contain Feb 29
                return true;
            }
            return matches!(start.month, 1 | 2);
        }
        if is_leap_year(end.year) {
            return match end.month {
                1 => false,
                2 => end.day == LONG_FEB_LEN,
                _ => true,
            };
        }
        false
    }
}
