//! Logical functions

use super::arg_value;
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::operand::coerce_value_to_boolean;
use crate::value::ValueEval;
use tabulon_core::CellError;

/// A fallback argument as returned to the caller; an empty argument reads as 0
fn fallback<'a>(args: &[ValueEval<'a>], index: usize) -> ValueEval<'a> {
    match args.get(index) {
        Some(ValueEval::MissingArg) | None => ValueEval::Number(0.0),
        Some(value) => value.clone(),
    }
}

/// IFERROR(value, value_if_error) - Returns value_if_error when value is any error
pub fn fn_iferror<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    match arg_value(args, 0, ctx) {
        Ok(value) => Ok(value),
        Err(_) => Ok(fallback(args, 1)),
    }
}

/// IFNA(value, value_if_na) - Returns value_if_na when value is #N/A
///
/// Every other error passes through unchanged.
pub fn fn_ifna<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    match arg_value(args, 0, ctx) {
        Err(CellError::Na) => Ok(fallback(args, 1)),
        other => other,
    }
}

/// IFS(condition1, value1, [condition2, value2], ...) - Returns the first TRUE condition's value
///
/// Returns #N/A if no condition is TRUE.
pub fn fn_ifs<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    // condition-value pairs only
    if args.len() % 2 != 0 {
        return Err(CellError::Value);
    }

    for pair in (0..args.len()).step_by(2) {
        let condition = arg_value(args, pair, ctx)?;
        if coerce_value_to_boolean(&condition, false)?.unwrap_or(false) {
            return Ok(args[pair + 1].clone());
        }
    }
    Err(CellError::Na)
}

/// SWITCH(expression, value1, result1, [value2, result2], ..., [default])
///
/// Returns the result for the first value equal to expression. A trailing unpaired
/// argument is the default; without one a miss is #N/A. Errors in cases or results
/// that are not chosen stay hidden.
pub fn fn_switch<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let expression = arg_value(args, 0, ctx)?;

    let remaining = args.len().saturating_sub(1);
    let num_pairs = remaining / 2;

    for pair_idx in 0..num_pairs {
        let value_idx = 1 + pair_idx * 2;
        // a case that evaluates to an error never matches
        let Ok(value) = arg_value(args, value_idx, ctx) else {
            continue;
        };
        if values_match(&expression, &value) {
            return Ok(args[value_idx + 1].clone());
        }
    }

    if remaining % 2 == 1 {
        Ok(fallback(args, args.len() - 1))
    } else {
        Err(CellError::Na)
    }
}

/// Equality used by SWITCH
fn values_match(a: &ValueEval<'_>, b: &ValueEval<'_>) -> bool {
    match (a, b) {
        (ValueEval::Number(x), ValueEval::Number(y)) => (x - y).abs() < 1e-10,
        (ValueEval::Boolean(x), ValueEval::Boolean(y)) => x == y,
        (ValueEval::Text(x), ValueEval::Text(y)) => x.to_lowercase() == y.to_lowercase(),
        (ValueEval::Blank, ValueEval::Blank) => true,

        (ValueEval::Blank, ValueEval::Number(n)) | (ValueEval::Number(n), ValueEval::Blank) => {
            *n == 0.0
        }
        (ValueEval::Blank, ValueEval::Text(s)) | (ValueEval::Text(s), ValueEval::Blank) => {
            s.is_empty()
        }

        _ => false,
    }
}
