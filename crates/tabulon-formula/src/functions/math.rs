//! Math functions

use std::sync::{Mutex, PoisonError};

use super::{arg_double, arg_value, FreeRefFunction};
use crate::context::OperationEvaluationContext;
use crate::error::EvalResult;
use crate::operand::{coerce_value_to_int, flatten, parse_double};
use crate::value::ValueEval;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use tabulon_core::CellError;

/// Largest integer an `f64` holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// MROUND(number, multiple) - Rounds a number to the nearest multiple
///
/// Halves round away from zero. Number and multiple must not have opposite signs.
pub fn fn_mround<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let number = arg_double(args, 0, ctx)?;
    let multiple = arg_double(args, 1, ctx)?;

    if multiple == 0.0 {
        return Ok(ValueEval::Number(0.0));
    }
    if (number < 0.0 && multiple > 0.0) || (number > 0.0 && multiple < 0.0) {
        return Err(CellError::Num);
    }
    Ok(ValueEval::Number(round_to_multiple(number, multiple)))
}

fn round_to_multiple(number: f64, multiple: f64) -> f64 {
    let exact = match (Decimal::from_f64(number), Decimal::from_f64(multiple)) {
        (Some(n), Some(m)) => n
            .checked_div(m)
            .map(|q| q.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|q| q.checked_mul(m))
            .and_then(|r| r.to_f64()),
        _ => None,
    };
    // out of decimal range
    exact.unwrap_or_else(|| multiple * (number / multiple).round())
}

/// RANDBETWEEN(bottom, top) - Returns a random integer between bottom and top (inclusive)
///
/// Each instance owns its generator; a seeded instance repeats the same sequence.
pub struct RandBetween {
    rng: Mutex<StdRng>,
}

impl RandBetween {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn sample(&self, args: &[ValueEval<'_>], ctx: &OperationEvaluationContext) -> EvalResult<f64> {
        if args.len() != 2 {
            return Err(CellError::Value);
        }
        let bottom = arg_double(args, 0, ctx)?;
        let top = arg_double(args, 1, ctx)?;
        if bottom > top {
            return Err(CellError::Num);
        }

        let low = bottom.ceil();
        // RANDBETWEEN(1.2, 1.8) can only return 2
        let high = top.floor().max(low);
        if low.abs() > MAX_EXACT_INTEGER || high.abs() > MAX_EXACT_INTEGER {
            return Err(CellError::Num);
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rng.gen_range(low as i64..=high as i64) as f64)
    }
}

impl FreeRefFunction for RandBetween {
    fn evaluate<'a>(
        &self,
        args: &[ValueEval<'a>],
        ctx: &OperationEvaluationContext,
    ) -> ValueEval<'a> {
        match self.sample(args, ctx) {
            Ok(n) => ValueEval::Number(n),
            Err(e) => ValueEval::Error(e),
        }
    }

    fn is_volatile(&self) -> bool {
        true
    }
}

/// QUOTIENT(numerator, denominator) - Returns the integer portion of a division
pub fn fn_quotient<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let numerator = arg_double(args, 0, ctx)?;
    let denominator = arg_double(args, 1, ctx)?;
    if denominator == 0.0 {
        return Err(CellError::Div0);
    }
    Ok(ValueEval::Number((numerator / denominator).trunc()))
}

/// Non-negative integers from every argument; blanks are skipped
fn collect_integers(args: &[ValueEval<'_>]) -> EvalResult<Vec<u64>> {
    let mut values = Vec::new();
    for arg in args {
        for value in flatten(arg) {
            let n = match value {
                ValueEval::Blank | ValueEval::MissingArg => continue,
                ValueEval::Number(n) => n,
                ValueEval::Text(s) => {
                    let n = parse_double(&s);
                    if n.is_nan() {
                        return Err(CellError::Value);
                    }
                    n
                }
                ValueEval::Error(e) => return Err(e),
                _ => return Err(CellError::Value),
            };
            let n = n.floor();
            if n < 0.0 || n >= MAX_EXACT_INTEGER {
                return Err(CellError::Num);
            }
            values.push(n as u64);
        }
    }
    Ok(values)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// GCD(number1, [number2], ...) - Returns the greatest common divisor
pub fn fn_gcd<'a>(
    args: &[ValueEval<'a>],
    _ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let result = collect_integers(args)?.into_iter().fold(0, gcd);
    Ok(ValueEval::Number(result as f64))
}

/// LCM(number1, [number2], ...) - Returns the least common multiple
pub fn fn_lcm<'a>(
    args: &[ValueEval<'a>],
    _ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let values = collect_integers(args)?;
    if values.is_empty() {
        return Ok(ValueEval::Number(0.0));
    }
    let mut result: u64 = 1;
    for n in values {
        if n == 0 {
            return Ok(ValueEval::Number(0.0));
        }
        result = (result / gcd(result, n))
            .checked_mul(n)
            .filter(|r| (*r as f64) < MAX_EXACT_INTEGER)
            .ok_or(CellError::Num)?;
    }
    Ok(ValueEval::Number(result as f64))
}

/// FACTDOUBLE(number) - Returns the double factorial n!!
pub fn fn_factdouble<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let n = coerce_value_to_int(&arg_value(args, 0, ctx)?)?;
    if n < 0 {
        return Err(CellError::Num);
    }
    let mut result = 1.0_f64;
    let mut k = f64::from(n);
    while k > 1.0 {
        result *= k;
        if result.is_infinite() {
            return Err(CellError::Num);
        }
        k -= 2.0;
    }
    Ok(ValueEval::Number(result))
}

/// SQRTPI(number) - Returns the square root of number * pi
pub fn fn_sqrtpi<'a>(
    args: &[ValueEval<'a>],
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let n = arg_double(args, 0, ctx)?;
    if n < 0.0 {
        return Err(CellError::Num);
    }
    Ok(ValueEval::Number((n * std::f64::consts::PI).sqrt()))
}
