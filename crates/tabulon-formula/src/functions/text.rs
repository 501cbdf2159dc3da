//! Text functions

use super::arg_value;
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::operand::{coerce_value_to_boolean, coerce_value_to_string, flatten};
use crate::value::{TwoDEval, ValueEval};
use tabulon_core::CellError;

/// Longest text a cell can hold
const MAX_TEXT_LENGTH: usize = 32_767;

/// Text of every value in an operand; the first error wins
fn collect_text(arg: &ValueEval<'_>) -> EvalResult<Vec<String>> {
    flatten(arg)
        .iter()
        .map(coerce_value_to_string)
        .collect()
}

fn check_length(text: String) -> EvalResult<String> {
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(CellError::Value);
    }
    Ok(text)
}

/// Delimiters for TEXTJOIN
///
/// A multi-cell delimiter area contributes the cells of its last row, which are then
/// used in turn between successive values.
fn delimiters(
    arg: &ValueEval<'_>,
    ctx: &OperationEvaluationContext,
) -> EvalResult<Vec<String>> {
    let grid: &dyn TwoDEval<'_> = match arg.as_two_d() {
        Some(grid) if grid.width() * grid.height() > 1 => grid,
        _ => {
            let value = arg_value(std::slice::from_ref(arg), 0, ctx)?;
            return Ok(vec![coerce_value_to_string(&value)?]);
        }
    };
    let last_row = grid.height() - 1;
    (0..grid.width())
        .map(|col| coerce_value_to_string(&grid.value(last_row, col)))
        .collect()
}

/// TEXTJOIN(delimiter, ignore_empty, text1, [text2], ...) - Joins text with a delimiter
pub fn fn_textjoin<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let delimiter_arg = args.first().ok_or(CellError::Value)?;
    let delimiters = delimiters(delimiter_arg, ctx)?;
    let ignore_empty = coerce_value_to_boolean(&arg_value(args, 1, ctx)?, false)?.unwrap_or(false);

    let mut values = Vec::new();
    for arg in args.iter().skip(2) {
        values.extend(
            collect_text(arg)?
                .into_iter()
                .filter(|s| !(ignore_empty && s.is_empty())),
        );
    }

    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(&delimiters[(i - 1) % delimiters.len()]);
        }
        out.push_str(value);
    }
    check_length(out).map(ValueEval::Text)
}

/// CONCAT(text1, [text2], ...) - Joins text from values and ranges
pub fn fn_concat<'a>(
    args: &[ValueEval<'a>],
    _ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let mut out = String::new();
    for arg in args {
        for text in collect_text(arg)? {
            out.push_str(&text);
        }
    }
    check_length(out).map(ValueEval::Text)
}
