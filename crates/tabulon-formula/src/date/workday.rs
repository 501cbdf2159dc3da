//! Working-day arithmetic for WORKDAY and NETWORKDAYS

use super::{weekday, MAX_SERIAL};
use crate::error::EvalResult;
use ahash::AHashSet;
use chrono::Weekday;
use tabulon_core::CellError;

/// Weekend codes accepted by WORKDAY.INTL / NETWORKDAYS.INTL
///
/// Bit `n` of the mask is set when the weekday with `num_days_from_monday() == n` is a
/// non-working day.
const WEEKEND_PATTERNS: [(i32, u8); 14] = [
    (1, 0b110_0000),  // Saturday, Sunday
    (2, 0b100_0001),  // Sunday, Monday
    (3, 0b000_0011),  // Monday, Tuesday
    (4, 0b000_0110),  // Tuesday, Wednesday
    (5, 0b000_1100),  // Wednesday, Thursday
    (6, 0b001_1000),  // Thursday, Friday
    (7, 0b011_0000),  // Friday, Saturday
    (11, 0b100_0000), // Sunday only
    (12, 0b000_0001), // Monday only
    (13, 0b000_0010), // Tuesday only
    (14, 0b000_0100), // Wednesday only
    (15, 0b000_1000), // Thursday only
    (16, 0b001_0000), // Friday only
    (17, 0b010_0000), // Saturday only
];

const ALL_DAYS: u8 = 0b111_1111;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// The set of non-working weekdays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekendPattern {
    mask: u8,
}

impl WeekendPattern {
    /// Saturday and Sunday
    pub const STANDARD: WeekendPattern = WeekendPattern { mask: 0b110_0000 };

    /// Look up one of the numbered weekend codes (1-7, 11-17)
    pub fn from_code(code: i32) -> EvalResult<Self> {
        WEEKEND_PATTERNS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, mask)| Self { mask })
            .ok_or(CellError::Num)
    }

    /// Parse a seven character mask such as `"0000011"`, Monday first, `1` = weekend
    ///
    /// A mask that makes every day a weekend is rejected since no working day would remain.
    pub fn from_mask(text: &str) -> EvalResult<Self> {
        if text.chars().count() != 7 {
            return Err(CellError::Value);
        }
        let mut mask = 0u8;
        for (i, ch) in text.chars().enumerate() {
            match ch {
                '0' => {}
                '1' => mask |= 1 << i,
                _ => return Err(CellError::Value),
            }
        }
        if mask == ALL_DAYS {
            return Err(CellError::Value);
        }
        Ok(Self { mask })
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.mask & (1 << day.num_days_from_monday()) != 0
    }

    /// Whether the date serial falls on a weekend day
    pub fn is_weekend(&self, serial: f64) -> bool {
        self.contains(weekday(serial))
    }

    /// The weekend days, Monday first
    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.iter().copied().filter(|day| self.contains(*day))
    }
}

impl Default for WeekendPattern {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Counts and walks working days between date serials
pub struct WorkdayCalculator;

impl WorkdayCalculator {
    /// Working days from `start` to `end` inclusive with a Saturday/Sunday weekend
    pub fn calculate_workdays(start: f64, end: f64, holidays: &[f64]) -> i32 {
        Self::calculate_network_days(start, end, WeekendPattern::STANDARD, holidays)
    }

    /// Working days from `start` to `end` inclusive
    ///
    /// Negative when `end` is before `start`. Holidays on weekend days or outside the range
    /// are ignored, and a holiday listed twice is only subtracted once.
    pub fn calculate_network_days(
        start: f64,
        end: f64,
        pattern: WeekendPattern,
        holidays: &[f64],
    ) -> i32 {
        let start = start.floor();
        let end = end.floor();
        if start > end {
            return -Self::calculate_network_days(end, start, pattern, holidays);
        }

        let days = (end - start) as i64 + 1;
        let weekend_days: i64 = pattern
            .days()
            .map(|day| Self::past_days_of_week(start, end, day))
            .sum();
        let holiday_days = Self::calculate_non_weekend_holidays(start, end, pattern, holidays);

        (days - weekend_days - holiday_days) as i32
    }

    /// How many times `day` occurs between `start` and `end` inclusive
    pub fn past_days_of_week(start: f64, end: f64, day: Weekday) -> i64 {
        let start = start.floor() as i64;
        let end = end.floor() as i64;
        if start > end {
            return 0;
        }
        let start_index = weekday(start as f64).num_days_from_monday() as i64;
        let target_index = day.num_days_from_monday() as i64;
        let first = start + (target_index - start_index).rem_euclid(7);
        if first > end {
            0
        } else {
            (end - first) / 7 + 1
        }
    }

    /// Distinct holidays in `start..=end` that are not already weekend days
    pub fn calculate_non_weekend_holidays(
        start: f64,
        end: f64,
        pattern: WeekendPattern,
        holidays: &[f64],
    ) -> i64 {
        let (low, high) = if start <= end { (start, end) } else { (end, start) };
        let low = low.floor() as i64;
        let high = high.floor() as i64;
        holiday_set(holidays)
            .into_iter()
            .filter(|&day| day >= low && day <= high && !pattern.is_weekend(day as f64))
            .count() as i64
    }

    /// The date `steps` working days after (or before, if negative) `start`
    pub fn calculate_workday(start: f64, steps: i32, holidays: &[f64]) -> EvalResult<f64> {
        Self::calculate_workday_intl(start, steps, WeekendPattern::STANDARD, holidays)
    }

    /// [`Self::calculate_workday`] with a custom weekend
    ///
    /// `start` itself is never counted. Walking past the representable date range is
    /// `#NUM!`.
    pub fn calculate_workday_intl(
        start: f64,
        steps: i32,
        pattern: WeekendPattern,
        holidays: &[f64],
    ) -> EvalResult<f64> {
        let mut date = start.floor() as i64;
        if steps == 0 {
            return Ok(date as f64);
        }

        let holidays = holiday_set(holidays);
        let direction: i64 = if steps > 0 { 1 } else { -1 };
        let mut remaining = steps.unsigned_abs();

        while remaining > 0 {
            date += direction;
            if !(0..=MAX_SERIAL).contains(&date) {
                return Err(CellError::Num);
            }
            if !pattern.is_weekend(date as f64) && !holidays.contains(&date) {
                remaining -= 1;
            }
        }

        Ok(date as f64)
    }
}

fn holiday_set(holidays: &[f64]) -> AHashSet<i64> {
    holidays.iter().map(|h| h.round() as i64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::SimpleDate;

    fn serial(y: i32, m: u32, d: u32) -> f64 {
        SimpleDate::new(y, m, d).unwrap().to_serial() as f64
    }

    #[test]
    fn test_full_week_has_five_workdays() {
        let monday = serial(2024, 1, 1);
        assert_eq!(WorkdayCalculator::calculate_workdays(monday, monday + 6.0, &[]), 5);
    }

    #[test]
    fn test_workdays_with_holidays() {
        let monday = serial(2024, 1, 1);
        let wednesday = monday + 2.0;
        let saturday = monday + 5.0;
        // duplicates and weekend holidays are ignored
        let holidays = [wednesday, wednesday + 0.3, saturday, monday + 30.0];
        assert_eq!(
            WorkdayCalculator::calculate_workdays(monday, monday + 6.0, &holidays),
            4
        );
    }

    #[test]
    fn test_workdays_reversed_is_negative() {
        let monday = serial(2024, 1, 1);
        assert_eq!(WorkdayCalculator::calculate_workdays(monday + 13.0, monday, &[]), -10);
    }

    #[test]
    fn test_past_days_of_week() {
        let monday = serial(2024, 1, 1);
        assert_eq!(WorkdayCalculator::past_days_of_week(monday, monday + 13.0, Weekday::Sun), 2);
        assert_eq!(WorkdayCalculator::past_days_of_week(monday, monday, Weekday::Mon), 1);
        assert_eq!(WorkdayCalculator::past_days_of_week(monday, monday + 5.0, Weekday::Sun), 0);
    }

    #[test]
    fn test_workday_walk() {
        let friday = serial(2024, 1, 5);
        assert_eq!(WorkdayCalculator::calculate_workday(friday, 1, &[]), Ok(friday + 3.0));
        assert_eq!(WorkdayCalculator::calculate_workday(friday, -5, &[]), Ok(friday - 7.0));
        assert_eq!(WorkdayCalculator::calculate_workday(friday, 0, &[]), Ok(friday));
        // Monday off
        assert_eq!(
            WorkdayCalculator::calculate_workday(friday, 1, &[friday + 3.0]),
            Ok(friday + 4.0)
        );
    }

    #[test]
    fn test_workday_intl_patterns() {
        let friday = serial(2024, 1, 5);
        let fri_sat = WeekendPattern::from_code(7).unwrap();
        assert_eq!(
            WorkdayCalculator::calculate_workday_intl(friday, 1, fri_sat, &[]),
            Ok(friday + 2.0)
        );
        let sunday_only = WeekendPattern::from_mask("0000001").unwrap();
        assert_eq!(
            WorkdayCalculator::calculate_workday_intl(friday, 1, sunday_only, &[]),
            Ok(friday + 1.0)
        );
    }

    #[test]
    fn test_workday_out_of_range() {
        assert_eq!(
            WorkdayCalculator::calculate_workday(MAX_SERIAL as f64 - 1.0, 10, &[]),
            Err(CellError::Num)
        );
    }

    #[test]
    fn test_weekend_codes() {
        for code in [1, 2, 3, 4, 5, 6, 7, 11, 12, 13, 14, 15, 16, 17] {
            assert!(WeekendPattern::from_code(code).is_ok(), "code {code}");
        }
        for code in [0, 8, 10, 18, -1] {
            assert_eq!(WeekendPattern::from_code(code), Err(CellError::Num));
        }
        assert_eq!(WeekendPattern::from_code(1).unwrap(), WeekendPattern::STANDARD);
        let mask = WeekendPattern::from_mask("0000011").unwrap();
        assert_eq!(mask, WeekendPattern::STANDARD);
        assert!(mask.contains(Weekday::Sat));
        assert!(!mask.contains(Weekday::Fri));
    }

    #[test]
    fn test_bad_masks() {
        for text in ["1111111", "000011", "00000111", "0000a11", ""] {
            assert_eq!(WeekendPattern::from_mask(text), Err(CellError::Value), "{text}");
        }
        assert!(WeekendPattern::from_mask("0000000").is_ok());
    }
}
