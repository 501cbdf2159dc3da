//! Operand resolution and coercion
//!
//! Functions receive their arguments unevaluated as far as references go: a [`ValueEval`]
//! may still be a cell reference, an area or an array. The helpers here turn such operands
//! into scalars and coerce scalars to the type a function needs. Every failure is reported
//! as the [`CellError`] the cell should display.

use crate::date::parse_date;
use crate::error::EvalResult;
use crate::value::{ArrayEval, TwoDEval, ValueEval};
use tabulon_core::CellError;

/// Resolve an operand to a single scalar value
///
/// References are dereferenced. A multi-cell area is reduced by implicit intersection
/// with the invoking cell at `(row, col)`: a single column yields its cell on `row`, a
/// single row yields its cell on `col`, and a block yields the cell at the crossing of
/// both. An area that cannot be intersected is `#VALUE!`. Arrays yield their top-left
/// element. Error values come back on the error channel.
pub fn get_single_value<'a>(arg: &ValueEval<'a>, row: u32, col: u16) -> EvalResult<ValueEval<'a>> {
    let value = match arg {
        ValueEval::Ref(r) => r.inner_value(),
        ValueEval::Area(area) => choose_single_element_from_area(area, row, col)?,
        ValueEval::Array(array) => {
            if array.width() == 0 || array.height() == 0 {
                return Err(CellError::Value);
            }
            array.value(0, 0)
        }
        other => other.clone(),
    };
    match value {
        ValueEval::Error(e) => Err(e),
        value => Ok(value),
    }
}

fn choose_single_element_from_area<'a>(
    area: &crate::value::AreaEval<'a>,
    row: u32,
    col: u16,
) -> EvalResult<ValueEval<'a>> {
    if area.is_row() && area.is_column() {
        return Ok(area.value(0, 0));
    }
    if area.is_column() {
        if !area.contains_row(row) {
            return Err(CellError::Value);
        }
        return Ok(area.absolute_value(row, area.first_column()));
    }
    if area.is_row() {
        if !area.contains_column(col) {
            return Err(CellError::Value);
        }
        return Ok(area.absolute_value(area.first_row(), col));
    }
    if area.contains_row(row) && area.contains_column(col) {
        return Ok(area.absolute_value(row, col));
    }
    Err(CellError::Value)
}

/// Coerce a scalar to a number
///
/// Text is parsed as a number first and then as a date; booleans are 0 or 1; blanks are 0.
pub fn coerce_value_to_double(value: &ValueEval<'_>) -> EvalResult<f64> {
    match value {
        ValueEval::Number(n) => Ok(*n),
        ValueEval::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        ValueEval::Blank | ValueEval::MissingArg => Ok(0.0),
        ValueEval::Text(s) => {
            let n = parse_double(s);
            if !n.is_nan() {
                return Ok(n);
            }
            parse_date(s)
                .map(|date| date.to_serial() as f64)
                .map_err(|_| CellError::Value)
        }
        ValueEval::Error(e) => Err(*e),
        ValueEval::Ref(r) => coerce_value_to_double(&r.inner_value()),
        ValueEval::Area(_) | ValueEval::Array(_) => Err(CellError::Value),
    }
}

/// Coerce a scalar to an integer, rounding toward negative infinity
///
/// Values outside the `i32` range are `#NUM!`.
pub fn coerce_value_to_int(value: &ValueEval<'_>) -> EvalResult<i32> {
    checked_int(coerce_value_to_double(value)?.floor())
}

/// An already-rounded number as `i32`; NaN and out-of-range values are `#NUM!`
pub fn checked_int(d: f64) -> EvalResult<i32> {
    if !d.is_finite() || d < i32::MIN as f64 || d > i32::MAX as f64 {
        return Err(CellError::Num);
    }
    Ok(d as i32)
}

/// Coerce a scalar to its display text
pub fn coerce_value_to_string(value: &ValueEval<'_>) -> EvalResult<String> {
    match value {
        ValueEval::Number(n) => Ok(format_number(*n)),
        ValueEval::Text(s) => Ok(s.clone()),
        ValueEval::Boolean(true) => Ok("TRUE".to_string()),
        ValueEval::Boolean(false) => Ok("FALSE".to_string()),
        ValueEval::Blank | ValueEval::MissingArg => Ok(String::new()),
        ValueEval::Error(e) => Err(*e),
        ValueEval::Ref(r) => coerce_value_to_string(&r.inner_value()),
        ValueEval::Area(_) | ValueEval::Array(_) => Err(CellError::Value),
    }
}

/// Coerce a scalar to a boolean; blanks give `None`
///
/// With `strings_are_blanks` set, any text is treated as a blank (the rule for values
/// read from cells). Otherwise only `"TRUE"`/`"FALSE"` are accepted, case-insensitively.
pub fn coerce_value_to_boolean(
    value: &ValueEval<'_>,
    strings_are_blanks: bool,
) -> EvalResult<Option<bool>> {
    match value {
        ValueEval::Blank | ValueEval::MissingArg => Ok(None),
        ValueEval::Boolean(b) => Ok(Some(*b)),
        ValueEval::Number(n) => {
            if n.is_nan() {
                return Err(CellError::Value);
            }
            Ok(Some(*n != 0.0))
        }
        ValueEval::Text(s) => {
            if strings_are_blanks {
                return Ok(None);
            }
            if s.eq_ignore_ascii_case("TRUE") {
                Ok(Some(true))
            } else if s.eq_ignore_ascii_case("FALSE") {
                Ok(Some(false))
            } else {
                Err(CellError::Value)
            }
        }
        ValueEval::Error(e) => Err(*e),
        ValueEval::Ref(r) => coerce_value_to_boolean(&r.inner_value(), true),
        ValueEval::Area(_) | ValueEval::Array(_) => Err(CellError::Value),
    }
}

/// Parse number text the way a cell entry would be read, independent of locale
///
/// Accepts an optional sign, decimals, an exponent and a trailing `%`. Returns `NaN`
/// for anything else so callers can try another interpretation.
pub fn parse_double(text: &str) -> f64 {
    let text = text.trim();
    let (body, scale) = match text.strip_suffix('%') {
        Some(body) => (body.trim_end(), 0.01),
        None => (text, 1.0),
    };
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        || !body.chars().any(|c| c.is_ascii_digit())
    {
        return f64::NAN;
    }
    match body.parse::<f64>() {
        Ok(n) if n.is_finite() => n * scale,
        _ => f64::NAN,
    }
}

/// Format a number the way it reads in a cell with the General format
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Resolve an operand that must be a range into an `Area` or `Array` value
///
/// A cell reference becomes a 1x1 area and a plain scalar a 1x1 array. Error values
/// propagate.
pub fn resolve_range<'a>(arg: &ValueEval<'a>) -> EvalResult<ValueEval<'a>> {
    match arg {
        ValueEval::Area(_) | ValueEval::Array(_) => Ok(arg.clone()),
        ValueEval::Ref(r) => Ok(ValueEval::Area(r.to_area())),
        ValueEval::Error(e) => Err(*e),
        ValueEval::MissingArg => Err(CellError::Value),
        scalar => Ok(ValueEval::Array(ArrayEval::row(vec![scalar.clone()]))),
    }
}

/// Every scalar in an operand, row by row for areas and arrays
pub fn flatten<'a>(arg: &ValueEval<'a>) -> Vec<ValueEval<'a>> {
    match arg {
        ValueEval::Ref(r) => vec![r.inner_value()],
        ValueEval::Area(_) | ValueEval::Array(_) => match arg.as_two_d() {
            Some(grid) => grid.values(),
            None => Vec::new(),
        },
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{AreaEval, RefEval};
    use tabulon_core::Workbook;

    fn book() -> Workbook {
        let mut wb = Workbook::new();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_column_values("A1", [1.0, 2.0, 3.0]).unwrap();
        sheet.set_cell_value("B2", "x").unwrap();
        sheet.set_cell_value("C3", CellError::Div0).unwrap();
        wb
    }

    #[test]
    fn test_single_value_from_references() {
        let wb = book();
        let r = ValueEval::Ref(RefEval::from_a1(&wb, 0, "A2").unwrap());
        assert_eq!(get_single_value(&r, 0, 0), Ok(ValueEval::Number(2.0)));

        let area = ValueEval::Area(AreaEval::from_a1(&wb, 0, "A3").unwrap());
        assert_eq!(get_single_value(&area, 9, 9), Ok(ValueEval::Number(3.0)));

        let err = ValueEval::Ref(RefEval::from_a1(&wb, 0, "C3").unwrap());
        assert_eq!(get_single_value(&err, 0, 0), Err(CellError::Div0));
    }

    #[test]
    fn test_implicit_intersection() {
        let wb = book();
        let column = ValueEval::Area(AreaEval::from_a1(&wb, 0, "A1:A3").unwrap());
        assert_eq!(get_single_value(&column, 1, 5), Ok(ValueEval::Number(2.0)));
        assert_eq!(get_single_value(&column, 7, 5), Err(CellError::Value));

        let row = ValueEval::Area(AreaEval::from_a1(&wb, 0, "A2:C2").unwrap());
        assert_eq!(get_single_value(&row, 20, 1), Ok(ValueEval::text("x")));

        let block = ValueEval::Area(AreaEval::from_a1(&wb, 0, "A1:C3").unwrap());
        assert_eq!(get_single_value(&block, 0, 0), Ok(ValueEval::Number(1.0)));
        assert_eq!(get_single_value(&block, 5, 0), Err(CellError::Value));
    }

    #[test]
    fn test_array_uses_first_element() {
        let array = ValueEval::Array(ArrayEval::row(vec![
            ValueEval::Number(4.0),
            ValueEval::Number(5.0),
        ]));
        assert_eq!(get_single_value(&array, 3, 3), Ok(ValueEval::Number(4.0)));
    }

    #[test]
    fn test_coerce_to_double() {
        assert_eq!(coerce_value_to_double(&ValueEval::text(" 12.5 ")), Ok(12.5));
        assert_eq!(coerce_value_to_double(&ValueEval::text("50%")), Ok(0.5));
        assert_eq!(coerce_value_to_double(&ValueEval::Boolean(true)), Ok(1.0));
        assert_eq!(coerce_value_to_double(&ValueEval::Blank), Ok(0.0));
        assert_eq!(coerce_value_to_double(&ValueEval::text("2000-01-01")), Ok(36526.0));
        assert_eq!(
            coerce_value_to_double(&ValueEval::text("abc")),
            Err(CellError::Value)
        );
        assert_eq!(
            coerce_value_to_double(&ValueEval::text("03/15/2024")),
            Err(CellError::Value)
        );
        assert_eq!(
            coerce_value_to_double(&ValueEval::Error(CellError::Na)),
            Err(CellError::Na)
        );
    }

    #[test]
    fn test_coerce_to_int_and_string() {
        assert_eq!(coerce_value_to_int(&ValueEval::Number(-2.5)), Ok(-3));
        assert_eq!(coerce_value_to_int(&ValueEval::Number(1e12)), Err(CellError::Num));
        assert_eq!(coerce_value_to_int(&ValueEval::Number(f64::NAN)), Err(CellError::Num));
        assert_eq!(coerce_value_to_int(&ValueEval::text("7.9")), Ok(7));
        assert_eq!(coerce_value_to_string(&ValueEval::Number(3.0)), Ok("3".to_string()));
        assert_eq!(coerce_value_to_string(&ValueEval::Number(0.25)), Ok("0.25".to_string()));
        assert_eq!(coerce_value_to_string(&ValueEval::Boolean(false)), Ok("FALSE".to_string()));
        assert_eq!(coerce_value_to_string(&ValueEval::Blank), Ok(String::new()));
    }

    #[test]
    fn test_coerce_to_boolean() {
        assert_eq!(coerce_value_to_boolean(&ValueEval::Blank, false), Ok(None));
        assert_eq!(coerce_value_to_boolean(&ValueEval::Number(2.0), false), Ok(Some(true)));
        assert_eq!(coerce_value_to_boolean(&ValueEval::text("false"), false), Ok(Some(false)));
        assert_eq!(coerce_value_to_boolean(&ValueEval::text("yes"), true), Ok(None));
        assert_eq!(
            coerce_value_to_boolean(&ValueEval::text("yes"), false),
            Err(CellError::Value)
        );
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(parse_double("1e3"), 1000.0);
        assert_eq!(parse_double("-.5"), -0.5);
        assert!(parse_double("inf").is_nan());
        assert!(parse_double("NaN").is_nan());
        assert!(parse_double("").is_nan());
        assert!(parse_double("1,000").is_nan());
        assert!(parse_double("e").is_nan());
    }
}
