//! Engineering functions

use super::{arg_double, is_omitted};
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::value::ValueEval;

/// Optional numeric argument with a default of 0
fn optional_double(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<f64> {
    if is_omitted(args, index) {
        Ok(0.0)
    } else {
        arg_double(args, index, ctx)
    }
}

fn indicator<'a>(condition: bool) -> ValueEval<'a> {
    ValueEval::Number(if condition { 1.0 } else { 0.0 })
}

/// DELTA(number1, [number2]) - Returns 1 if the numbers are equal, 0 otherwise
pub fn fn_delta<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let a = arg_double(args, 0, ctx)?;
    let b = optional_double(args, 1, ctx)?;
    Ok(indicator(a == b))
}

/// GESTEP(number, [step]) - Returns 1 if number >= step, 0 otherwise
pub fn fn_gestep<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let number = arg_double(args, 0, ctx)?;
    let step = optional_double(args, 1, ctx)?;
    Ok(indicator(number >= step))
}
