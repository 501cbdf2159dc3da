//! Date functions

use super::{arg_double, arg_int, arg_value, is_omitted};
use crate::context::OperationEvaluationContext;
use crate::date::{
    checked_serial, weekday, SimpleDate, WeekendPattern, WorkdayCalculator, YearFracCalculator,
};
use crate::error::EvalResult;
use crate::operand::{coerce_value_to_double, flatten};
use crate::value::ValueEval;
use chrono::Datelike;
use tabulon_core::CellError;

/// Start date argument: a serial inside the supported range, time of day dropped
fn date_arg(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<f64> {
    checked_serial(arg_double(args, index, ctx)?)
}

/// Holiday list argument: a single date, an area or an array of dates
///
/// Blank cells are skipped; anything that is not a date is `#VALUE!`. Holidays are
/// whole days, rounded to the nearest one.
fn holidays_arg(args: &[ValueEval<'_>], index: usize) -> EvalResult<Vec<f64>> {
    if is_omitted(args, index) {
        return Ok(Vec::new());
    }
    let mut holidays = Vec::new();
    for value in flatten(&args[index]) {
        match value {
            ValueEval::Blank => continue,
            ValueEval::Error(e) => return Err(e),
            other => holidays.push(checked_serial(coerce_value_to_double(&other)?.round())?),
        }
    }
    Ok(holidays)
}

/// Weekend argument: a numeric code or a seven character mask
fn weekend_arg(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<WeekendPattern> {
    if is_omitted(args, index) {
        return Ok(WeekendPattern::STANDARD);
    }
    match arg_value(args, index, ctx)? {
        ValueEval::Blank => Ok(WeekendPattern::STANDARD),
        ValueEval::Text(mask) => WeekendPattern::from_mask(&mask),
        other => {
            let code = coerce_value_to_double(&other)?.trunc();
            if code < i32::MIN as f64 || code > i32::MAX as f64 {
                return Err(CellError::Num);
            }
            WeekendPattern::from_code(code as i32)
        }
    }
}

/// EDATE(start_date, months) - Returns the serial of the date a number of months away
pub fn fn_edate<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let months = arg_int(args, 1, ctx)?;
    let date = SimpleDate::from_serial(start)?.add_months(months)?;
    Ok(ValueEval::Number(date.to_serial() as f64))
}

/// EOMONTH(start_date, months) - Returns the last day of the month a number of months away
pub fn fn_eomonth<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let months = arg_int(args, 1, ctx)?;
    let date = SimpleDate::from_serial(start)?
        .add_months(months)?
        .end_of_month();
    Ok(ValueEval::Number(date.to_serial() as f64))
}

/// YEARFRAC(start_date, end_date, [basis]) - Returns the fraction of a year between two dates
pub fn fn_yearfrac<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let end = date_arg(args, 1, ctx)?;
    let basis = if is_omitted(args, 2) {
        0
    } else {
        arg_int(args, 2, ctx)?
    };
    YearFracCalculator::calculate(start, end, basis).map(ValueEval::Number)
}

/// WORKDAY(start_date, days, [holidays]) - Returns the date a number of working days away
pub fn fn_workday<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let days = arg_int(args, 1, ctx)?;
    let holidays = holidays_arg(args, 2)?;
    WorkdayCalculator::calculate_workday(start, days, &holidays).map(ValueEval::Number)
}

/// WORKDAY.INTL(start_date, days, [weekend], [holidays])
pub fn fn_workday_intl<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let days = arg_int(args, 1, ctx)?;
    let weekend = weekend_arg(args, 2, ctx)?;
    let holidays = holidays_arg(args, 3)?;
    WorkdayCalculator::calculate_workday_intl(start, days, weekend, &holidays)
        .map(ValueEval::Number)
}

/// NETWORKDAYS(start_date, end_date, [holidays]) - Counts working days between two dates
pub fn fn_networkdays<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let end = date_arg(args, 1, ctx)?;
    let holidays = holidays_arg(args, 2)?;
    let days = WorkdayCalculator::calculate_workdays(start, end, &holidays);
    Ok(ValueEval::Number(days as f64))
}

/// NETWORKDAYS.INTL(start_date, end_date, [weekend], [holidays])
pub fn fn_networkdays_intl<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let start = date_arg(args, 0, ctx)?;
    let end = date_arg(args, 1, ctx)?;
    let weekend = weekend_arg(args, 2, ctx)?;
    let holidays = holidays_arg(args, 3)?;
    let days = WorkdayCalculator::calculate_network_days(start, end, weekend, &holidays);
    Ok(ValueEval::Number(days as f64))
}

/// WEEKNUM(serial_number, [return_type]) - Returns the week number of the year
///
/// Return types 1 and 17 start weeks on Sunday, 2 and 11 on Monday, 12-16 on Tuesday
/// through Saturday; 21 is the ISO 8601 week.
pub fn fn_weeknum<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let serial = date_arg(args, 0, ctx)?;
    let return_type = if is_omitted(args, 1) {
        1
    } else {
        arg_int(args, 1, ctx)?
    };

    let date = SimpleDate::from_serial(serial)?;
    if return_type == 21 {
        let naive = date.to_naive().ok_or(CellError::Num)?;
        return Ok(ValueEval::Number(naive.iso_week().week() as f64));
    }

    // first day of the week, counted from Monday = 0
    let week_start: u32 = match return_type {
        1 | 17 => 6,
        2 | 11 => 0,
        12..=16 => (return_type - 11) as u32,
        _ => return Err(CellError::Num),
    };

    let jan1 = SimpleDate::new(date.year, 1, 1)?.to_serial() as f64;
    let jan1_offset = (weekday(jan1).num_days_from_monday() + 7 - week_start) % 7;
    let day_of_year = serial - jan1;
    let week = ((day_of_year + jan1_offset as f64) / 7.0).floor() + 1.0;
    Ok(ValueEval::Number(week))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayEval;
    use pretty_assertions::assert_eq;

    fn ctx() -> OperationEvaluationContext {
        OperationEvaluationContext::simple()
    }

    fn serial(y: i32, m: u32, d: u32) -> f64 {
        SimpleDate::new(y, m, d).unwrap().to_serial() as f64
    }

    fn n(value: f64) -> ValueEval<'static> {
        ValueEval::Number(value)
    }

    #[test]
    fn test_edate_and_eomonth() {
        let jan31 = serial(2024, 1, 31);
        assert_eq!(fn_edate(&[n(jan31), n(1.0)], &ctx()), Ok(n(serial(2024, 2, 29))));
        assert_eq!(fn_edate(&[n(jan31), n(-1.9)], &ctx()), Ok(n(serial(2023, 12, 31))));
        assert_eq!(
            fn_eomonth(&[n(serial(2024, 1, 15)), n(2.0)], &ctx()),
            Ok(n(serial(2024, 3, 31)))
        );
        assert_eq!(
            fn_edate(&[ValueEval::text("2024-01-31"), n(1.0)], &ctx()),
            Ok(n(serial(2024, 2, 29)))
        );
        assert_eq!(fn_edate(&[n(-1.0), n(1.0)], &ctx()), Err(CellError::Num));
        assert_eq!(
            fn_edate(&[ValueEval::text("soon"), n(1.0)], &ctx()),
            Err(CellError::Value)
        );
    }

    #[test]
    fn test_yearfrac_defaults_to_us_30_360() {
        let start = n(serial(2012, 1, 1));
        let end = n(serial(2012, 7, 30));
        let result = fn_yearfrac(&[start.clone(), end.clone()], &ctx()).unwrap();
        assert_eq!(result, fn_yearfrac(&[start.clone(), end.clone(), n(0.0)], &ctx()).unwrap());
        assert_eq!(
            fn_yearfrac(&[start, end, n(5.0)], &ctx()),
            Err(CellError::Num)
        );
    }

    #[test]
    fn test_workday_with_holiday_array() {
        let friday = serial(2024, 1, 5);
        let holidays = ValueEval::Array(ArrayEval::column(vec![n(friday + 3.0), ValueEval::Blank]));
        assert_eq!(
            fn_workday(&[n(friday), n(1.0), holidays], &ctx()),
            Ok(n(friday + 4.0))
        );
        let bad = ValueEval::Array(ArrayEval::row(vec![ValueEval::text("x")]));
        assert_eq!(
            fn_workday(&[n(friday), n(1.0), bad], &ctx()),
            Err(CellError::Value)
        );
    }

    #[test]
    fn test_intl_weekend_arguments() {
        let friday = serial(2024, 1, 5);
        assert_eq!(
            fn_workday_intl(&[n(friday), n(1.0), n(7.0)], &ctx()),
            Ok(n(friday + 2.0))
        );
        assert_eq!(
            fn_workday_intl(&[n(friday), n(1.0), ValueEval::text("0000001")], &ctx()),
            Ok(n(friday + 1.0))
        );
        assert_eq!(
            fn_workday_intl(&[n(friday), n(1.0), n(9.0)], &ctx()),
            Err(CellError::Num)
        );
        assert_eq!(
            fn_workday_intl(&[n(friday), n(1.0), ValueEval::text("1111111")], &ctx()),
            Err(CellError::Value)
        );
        assert_eq!(
            fn_workday_intl(&[n(friday), n(1.0), ValueEval::MissingArg, n(friday + 3.0)], &ctx()),
            Ok(n(friday + 4.0))
        );
    }

    #[test]
    fn test_networkdays() {
        let monday = serial(2024, 1, 1);
        assert_eq!(fn_networkdays(&[n(monday), n(monday + 6.0)], &ctx()), Ok(n(5.0)));
        assert_eq!(
            fn_networkdays(&[n(monday + 6.0), n(monday)], &ctx()),
            Ok(n(-5.0))
        );
        assert_eq!(
            fn_networkdays_intl(&[n(monday), n(monday + 6.0), n(11.0)], &ctx()),
            Ok(n(6.0))
        );
    }

    #[test]
    fn test_weeknum() {
        // 2024-01-01 is a Monday
        let jan6 = n(serial(2024, 1, 6));
        let jan7 = n(serial(2024, 1, 7));
        assert_eq!(fn_weeknum(&[jan6.clone()], &ctx()), Ok(n(1.0)));
        assert_eq!(fn_weeknum(&[jan7.clone()], &ctx()), Ok(n(2.0)));
        assert_eq!(fn_weeknum(&[jan7.clone(), n(2.0)], &ctx()), Ok(n(1.0)));
        assert_eq!(fn_weeknum(&[n(serial(2024, 1, 8)), n(2.0)], &ctx()), Ok(n(2.0)));
        assert_eq!(fn_weeknum(&[n(serial(2021, 1, 1)), n(21.0)], &ctx()), Ok(n(53.0)));
        assert_eq!(fn_weeknum(&[jan6, n(3.0)], &ctx()), Err(CellError::Num));
    }
}
