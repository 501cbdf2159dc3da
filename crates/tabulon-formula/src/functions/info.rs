//! Information functions

use super::arg_value;
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::operand::coerce_value_to_double;
use crate::value::ValueEval;
use tabulon_core::CellError;

/// Whether the argument, truncated toward zero, is even
fn is_even(args: &[ValueEval<'_>], ctx: &OperationEvaluationContext) -> EvalResult<bool> {
    let value = arg_value(args, 0, ctx)?;
    if matches!(value, ValueEval::Boolean(_)) {
        return Err(CellError::Value);
    }
    let n = coerce_value_to_double(&value)?.trunc();
    Ok(n % 2.0 == 0.0)
}

/// ISEVEN(number) - Returns TRUE if the number is even
pub fn fn_iseven<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    is_even(args, ctx).map(ValueEval::Boolean)
}

/// ISODD(number) - Returns TRUE if the number is odd
pub fn fn_isodd<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    is_even(args, ctx).map(|even| ValueEval::Boolean(!even))
}
