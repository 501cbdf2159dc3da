//! Statistical functions

use super::criteria::CriteriaMatcher;
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::operand::{get_single_value, resolve_range};
use crate::value::{TwoDEval, ValueEval};
use log::trace;
use tabulon_core::CellError;

/// Fold the numbers of `data` whose cells satisfy every criteria pair
///
/// `args` is `(data_range, criteria_range1, criteria1, ...)`. Criteria ranges must have the
/// same shape as the data range. Text, booleans and blanks in the data range are ignored;
/// an error in a selected cell is the result. Returns `None` when nothing was selected.
fn fold_ifs(
    args: &[ValueEval<'_>],
    ctx: &OperationEvaluationContext,
    pick: fn(f64, f64) -> f64,
) -> EvalResult<Option<f64>> {
    if args.len() < 3 || (args.len() - 1) % 2 != 0 {
        return Err(CellError::Value);
    }

    let data_range = resolve_range(&args[0])?;
    let data = data_range.as_two_d().ok_or(CellError::Value)?;

    let mut criteria_ranges = Vec::with_capacity(args.len() / 2);
    let mut matchers = Vec::with_capacity(args.len() / 2);
    for pair in args[1..].chunks(2) {
        criteria_ranges.push(resolve_range(&pair[0])?);
        let criteria = match get_single_value(&pair[1], ctx.row(), ctx.column()) {
            Ok(value) => value,
            Err(e) => ValueEval::Error(e),
        };
        matchers.push(CriteriaMatcher::new(&criteria));
    }

    let mut ranges: Vec<&dyn TwoDEval<'_>> = Vec::with_capacity(criteria_ranges.len());
    for range in &criteria_ranges {
        let grid = range.as_two_d().ok_or(CellError::Value)?;
        if grid.width() != data.width() || grid.height() != data.height() {
            return Err(CellError::Value);
        }
        ranges.push(grid);
    }

    let mut result: Option<f64> = None;
    for row in 0..data.height() {
        for col in 0..data.width() {
            let selected = ranges
                .iter()
                .zip(&matchers)
                .all(|(range, matcher)| matcher.matches(&range.value(row, col)));
            if !selected {
                continue;
            }
            match data.value(row, col) {
                ValueEval::Number(n) => {
                    result = Some(result.map_or(n, |current| pick(current, n)));
                }
                ValueEval::Error(e) => return Err(e),
                _ => {}
            }
        }
    }
    trace!("conditional fold over {}x{} cells: {:?}", data.height(), data.width(), result);
    Ok(result)
}

/// MAXIFS(max_range, criteria_range1, criteria1, ...) - Maximum of the cells meeting all criteria
///
/// Returns 0 when no cell qualifies.
pub fn fn_maxifs<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let max = fold_ifs(args, ctx, f64::max)?;
    Ok(ValueEval::Number(max.unwrap_or(0.0)))
}

/// MINIFS(min_range, criteria_range1, criteria1, ...) - Minimum of the cells meeting all criteria
pub fn fn_minifs<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let min = fold_ifs(args, ctx, f64::min)?;
    Ok(ValueEval::Number(min.unwrap_or(0.0)))
}
