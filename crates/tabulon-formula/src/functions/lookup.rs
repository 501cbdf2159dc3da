//! Lookup functions

use super::{arg_int, arg_value, is_omitted};
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::lookup::{xlookup_index_of_value, MatchMode, SearchMode, ValueVector};
use crate::operand::resolve_range;
use crate::value::{ArrayEval, TwoDEval, ValueEval};
use log::trace;
use tabulon_core::CellError;

fn match_mode_arg(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<MatchMode> {
    if is_omitted(args, index) {
        return Ok(MatchMode::default());
    }
    MatchMode::from_code(arg_int(args, index, ctx)?)
}

fn search_mode_arg(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<SearchMode> {
    if is_omitted(args, index) {
        return Ok(SearchMode::default());
    }
    SearchMode::from_code(arg_int(args, index, ctx)?)
}

/// XLOOKUP(lookup_value, lookup_array, return_array, [if_not_found], [match_mode], [search_mode])
///
/// Searches the first column of lookup_array (or its only row when it is horizontal) and
/// returns the matching row (or column) of return_array. A caller that wants a single value
/// gets the first cell of that slice.
pub fn fn_xlookup<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let lookup_value = arg_value(args, 0, ctx)?;
    let lookup_range = resolve_range(args.get(1).ok_or(CellError::Value)?)?;
    let return_range = resolve_range(args.get(2).ok_or(CellError::Value)?)?;
    let match_mode = match_mode_arg(args, 4, ctx)?;
    let search_mode = search_mode_arg(args, 5, ctx)?;

    let lookup_grid = lookup_range.as_two_d().ok_or(CellError::Value)?;
    let return_grid = return_range.as_two_d().ok_or(CellError::Value)?;
    let vector = ValueVector::for_lookup(lookup_grid);
    let horizontal = vector.is_horizontal();
    if (horizontal && return_grid.width() != lookup_grid.width())
        || (!horizontal && return_grid.height() != lookup_grid.height())
    {
        return Err(CellError::Value);
    }

    let index = match xlookup_index_of_value(&lookup_value, &vector, match_mode, search_mode) {
        Ok(index) => index,
        Err(CellError::Na) => return not_found(args, ctx, return_grid, horizontal),
        Err(e) => return Err(e),
    };
    trace!("XLOOKUP matched position {}", index);

    if ctx.is_single_value() {
        return Ok(if horizontal {
            return_grid.value(0, index)
        } else {
            return_grid.value(index, 0)
        });
    }

    if let ValueEval::Area(area) = &return_range {
        let slice = if horizontal {
            area.column(index)
        } else {
            area.row(index)
        };
        return slice.map(ValueEval::Area).ok_or(CellError::Ref);
    }
    let slice = if horizontal {
        (0..return_grid.height())
            .map(|row| return_grid.value(row, index))
            .collect()
    } else {
        (0..return_grid.width())
            .map(|col| return_grid.value(index, col))
            .collect()
    };
    Ok(ValueEval::Array(if horizontal {
        ArrayEval::column(slice)
    } else {
        ArrayEval::row(slice)
    }))
}

/// The if_not_found result, spread across the return slice when an array is wanted
///
/// Text that is empty after trimming counts as not supplied.
fn not_found<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
    return_grid: &dyn TwoDEval<'a>,
    horizontal: bool,
) -> EvalResult<ValueEval<'a>> {
    if is_omitted(args, 3) {
        return Err(CellError::Na);
    }
    let value = match arg_value(args, 3, ctx)? {
        ValueEval::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(CellError::Na);
            }
            ValueEval::text(trimmed)
        }
        other => other,
    };
    if ctx.is_single_value() {
        return Ok(value);
    }
    Ok(ValueEval::Array(if horizontal {
        ArrayEval::column(vec![value; return_grid.height()])
    } else {
        ArrayEval::row(vec![value; return_grid.width()])
    }))
}

/// XMATCH(lookup_value, lookup_array, [match_mode], [search_mode]) - 1-based position of a match
pub fn fn_xmatch<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let lookup_value = arg_value(args, 0, ctx)?;
    let lookup_range = resolve_range(args.get(1).ok_or(CellError::Value)?)?;
    let match_mode = match_mode_arg(args, 2, ctx)?;
    let search_mode = search_mode_arg(args, 3, ctx)?;

    let grid = lookup_range.as_two_d().ok_or(CellError::Value)?;
    if !grid.is_row() && !grid.is_column() {
        return Err(CellError::Value);
    }
    let vector = ValueVector::for_lookup(grid);
    let index = xlookup_index_of_value(&lookup_value, &vector, match_mode, search_mode)?;
    Ok(ValueEval::Number((index + 1) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvaluationMode;
    use crate::value::AreaEval;
    use tabulon_core::Workbook;

    fn n(value: f64) -> ValueEval<'static> {
        ValueEval::Number(value)
    }

    fn t(s: &str) -> ValueEval<'static> {
        ValueEval::text(s)
    }

    fn ctx() -> OperationEvaluationContext {
        OperationEvaluationContext::simple()
    }

    fn book() -> Workbook {
        let mut wb = Workbook::new();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_column_values("A1", ["apple", "banana", "cherry"]).unwrap();
        sheet.set_column_values("B1", [1.5, 0.25, 4.0]).unwrap();
        sheet.set_column_values("C1", ["red", "yellow", "dark red"]).unwrap();
        wb
    }

    fn area<'a>(wb: &'a Workbook, range: &str) -> ValueEval<'a> {
        ValueEval::Area(AreaEval::from_a1(wb, 0, range).unwrap())
    }

    #[test]
    fn test_xmatch_exact() {
        let list = ValueEval::Array(ArrayEval::row(vec![n(5.0), n(3.0), n(9.0), n(1.0)]));
        assert_eq!(fn_xmatch(&[n(9.0), list.clone()], &ctx()), Ok(n(3.0)));
        assert_eq!(fn_xmatch(&[n(7.0), list.clone()], &ctx()), Err(CellError::Na));
        assert_eq!(fn_xmatch(&[n(7.0), list.clone(), n(1.0)], &ctx()), Ok(n(3.0)));
        assert_eq!(fn_xmatch(&[n(7.0), list, n(-1.0)], &ctx()), Ok(n(1.0)));
    }

    #[test]
    fn test_xmatch_modes() {
        let list = ValueEval::Array(ArrayEval::column(vec![t("a1"), t("b2"), t("a3")]));
        assert_eq!(fn_xmatch(&[t("a*"), list.clone(), n(2.0), n(-1.0)], &ctx()), Ok(n(3.0)));
        assert_eq!(
            fn_xmatch(&[t("a*"), list.clone(), n(2.0), n(2.0)], &ctx()),
            Err(CellError::Value)
        );
        assert_eq!(fn_xmatch(&[t("a1"), list, n(5.0)], &ctx()), Err(CellError::Value));
    }

    #[test]
    fn test_xlookup_single_value() {
        let wb = book();
        let args = [t("banana"), area(&wb, "A1:A3"), area(&wb, "B1:C3")];
        assert_eq!(fn_xlookup(&args, &ctx()), Ok(n(0.25)));
    }

    #[test]
    fn test_xlookup_array_returns_row() {
        let wb = book();
        let args = [t("CHERRY"), area(&wb, "A1:A3"), area(&wb, "B1:C3")];
        let array_ctx = ctx().with_mode(EvaluationMode::Array);
        assert_eq!(fn_xlookup(&args, &array_ctx), Ok(area(&wb, "B3:C3")));
    }

    #[test]
    fn test_xlookup_horizontal() {
        let keys = ValueEval::Array(ArrayEval::row(vec![n(10.0), n(20.0), n(30.0)]));
        let values = ValueEval::Array(ArrayEval::row(vec![t("x"), t("y"), t("z")]));
        let args = [n(25.0), keys, values, ValueEval::MissingArg, n(1.0)];
        assert_eq!(fn_xlookup(&args, &ctx()), Ok(t("z")));
    }

    #[test]
    fn test_xlookup_not_found() {
        let wb = book();
        let missing = [t("kiwi"), area(&wb, "A1:A3"), area(&wb, "B1:C3")];
        assert_eq!(fn_xlookup(&missing, &ctx()), Err(CellError::Na));

        let with_text = [t("kiwi"), area(&wb, "A1:A3"), area(&wb, "B1:C3"), t("  none ")];
        assert_eq!(fn_xlookup(&with_text, &ctx()), Ok(t("none")));

        let array_ctx = ctx().with_mode(EvaluationMode::Array);
        assert_eq!(
            fn_xlookup(&with_text, &array_ctx),
            Ok(ValueEval::Array(ArrayEval::row(vec![t("none"), t("none")])))
        );

        let blank_text = [t("kiwi"), area(&wb, "A1:A3"), area(&wb, "B1:C3"), t("   ")];
        assert_eq!(fn_xlookup(&blank_text, &ctx()), Err(CellError::Na));
    }

    #[test]
    fn test_xlookup_shape_mismatch() {
        let wb = book();
        let args = [t("apple"), area(&wb, "A1:A3"), area(&wb, "B1:B2")];
        assert_eq!(fn_xlookup(&args, &ctx()), Err(CellError::Value));
    }
}
