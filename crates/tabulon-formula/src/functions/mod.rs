//! Analysis ToolPak functions
//!
//! [`AnalysisToolPak`] maps upper-case function names to evaluators. Names that Excel
//! knows but this engine does not compute are bound to [`FunctionBinding::NotImplemented`]
//! so callers can tell "not supported yet" apart from "no such function".

pub mod criteria;
pub mod date;
pub mod engineering;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

use std::fmt;

use crate::context::OperationEvaluationContext;
use crate::error::{EvalResult, FormulaError, FormulaResult};
use crate::operand::{checked_int, coerce_value_to_double, get_single_value};
use crate::value::ValueEval;
use ahash::AHashMap;
use log::{debug, trace, warn};
use tabulon_core::CellError;

/// Argument `index` resolved to a scalar at the invoking cell
pub(crate) fn arg_value<'a>(
    args: &[ValueEval<'a>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<ValueEval<'a>> {
    let arg = args.get(index).ok_or(CellError::Value)?;
    get_single_value(arg, ctx.row(), ctx.column())
}

pub(crate) fn arg_double(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<f64> {
    coerce_value_to_double(&arg_value(args, index, ctx)?)
}

/// Argument `index` as a count or code, truncated toward zero
///
/// Month offsets, workday steps and mode codes drop their fraction the way Excel does:
/// `EDATE(d, -1.5)` moves one month back, not two. Plain integer coercion floors, see
/// [`coerce_value_to_int`](crate::operand::coerce_value_to_int).
pub(crate) fn arg_int(
    args: &[ValueEval<'_>],
    index: usize,
    ctx: &OperationEvaluationContext,
) -> EvalResult<i32> {
    checked_int(arg_double(args, index, ctx)?.trunc())
}

/// Whether optional argument `index` was left out or passed empty
pub(crate) fn is_omitted(args: &[ValueEval<'_>], index: usize) -> bool {
    args.get(index).map_or(true, ValueEval::is_missing)
}

/// Function implementation signature
///
/// Errors returned on the error channel become the function's [`ValueEval::Error`] result.
pub type FunctionImpl =
    for<'a> fn(&[ValueEval<'a>], &OperationEvaluationContext) -> EvalResult<ValueEval<'a>>;

/// Uniform entry point for every extended function
pub trait FreeRefFunction: Send + Sync {
    /// Evaluate with already-parsed arguments
    ///
    /// Never fails: argument and evaluation problems come back as a [`ValueEval::Error`].
    fn evaluate<'a>(
        &self,
        args: &[ValueEval<'a>],
        ctx: &OperationEvaluationContext,
    ) -> ValueEval<'a>;

    /// Whether the result may change on every recalculation
    fn is_volatile(&self) -> bool {
        false
    }
}

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (recalculates every time)
    pub volatile: bool,
}

impl FunctionDef {
    fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

impl FreeRefFunction for FunctionDef {
    fn evaluate<'a>(
        &self,
        args: &[ValueEval<'a>],
        ctx: &OperationEvaluationContext,
    ) -> ValueEval<'a> {
        trace!("{} called with {} argument(s)", self.name, args.len());
        if !self.accepts(args.len()) {
            return ValueEval::Error(CellError::Value);
        }
        match (self.implementation)(args, ctx) {
            Ok(value) => value,
            Err(e) => ValueEval::Error(e),
        }
    }

    fn is_volatile(&self) -> bool {
        self.volatile
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("volatile", &self.volatile)
            .finish()
    }
}

/// What a recognized function name is bound to
pub enum FunctionBinding {
    Implemented(Box<dyn FreeRefFunction>),
    /// A known Analysis ToolPak function without an implementation
    NotImplemented(&'static str),
}

impl FunctionBinding {
    pub fn is_implemented(&self) -> bool {
        matches!(self, FunctionBinding::Implemented(_))
    }

    /// Evaluate the bound function, or fail with [`FormulaError::NotImplemented`]
    pub fn evaluate<'a>(
        &self,
        args: &[ValueEval<'a>],
        ctx: &OperationEvaluationContext,
    ) -> FormulaResult<ValueEval<'a>> {
        match self {
            FunctionBinding::Implemented(function) => Ok(function.evaluate(args, ctx)),
            FunctionBinding::NotImplemented(name) => {
                warn!("{} is recognized but not implemented", name);
                Err(FormulaError::NotImplemented((*name).to_string()))
            }
        }
    }
}

impl fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBinding::Implemented(_) => f.write_str("Implemented"),
            FunctionBinding::NotImplemented(name) => write!(f, "NotImplemented({})", name),
        }
    }
}

/// Name resolution for functions outside the core operator set
pub trait UdfFinder {
    /// Binding for `name` (case-insensitive), `None` if the name is unknown
    fn find_function(&self, name: &str) -> Option<&FunctionBinding>;
}

/// Settings for a function table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolPakConfig {
    /// Seed for RANDBETWEEN; `None` seeds from the operating system
    pub rng_seed: Option<u64>,
}

impl ToolPakConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make RANDBETWEEN deterministic
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// Function registry
pub struct AnalysisToolPak {
    functions: AHashMap<String, FunctionBinding>,
}

impl AnalysisToolPak {
    /// Create a registry with all built-in functions
    pub fn new() -> Self {
        Self::with_config(ToolPakConfig::default())
    }

    pub fn with_config(config: ToolPakConfig) -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_date_functions();
        registry.register_math_functions(&config);
        registry.register_info_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_statistical_functions();
        registry.register_lookup_functions();
        registry.register_engineering_functions();
        registry.register_placeholders();

        debug!(
            "Analysis ToolPak table built: {} implemented, {} placeholders",
            registry.implemented_count(),
            registry.functions.len() - registry.implemented_count()
        );
        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionBinding> {
        self.functions.get(&name.to_uppercase())
    }

    /// Whether `name` is bound to a working implementation
    pub fn is_implemented(&self, name: &str) -> bool {
        self.get(name).map_or(false, FunctionBinding::is_implemented)
    }

    /// Resolve and evaluate `name`
    ///
    /// Unknown names fail with [`FormulaError::UnknownFunction`] and recognized but
    /// unimplemented ones with [`FormulaError::NotImplemented`]. Everything else, including
    /// evaluation errors, is an `Ok` value.
    pub fn invoke<'a>(
        &self,
        name: &str,
        args: &[ValueEval<'a>],
        ctx: &OperationEvaluationContext,
    ) -> FormulaResult<ValueEval<'a>> {
        match self.get(name) {
            Some(binding) => binding.evaluate(args, ctx),
            None => Err(FormulaError::UnknownFunction(name.to_string())),
        }
    }

    /// Names of every recognized function, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn implemented_count(&self) -> usize {
        self.functions
            .values()
            .filter(|binding| binding.is_implemented())
            .count()
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.register_function(def.name, Box::new(def));
    }

    /// Register a custom evaluator under `name`
    pub fn register_function(&mut self, name: &str, function: Box<dyn FreeRefFunction>) {
        self.functions
            .insert(name.to_uppercase(), FunctionBinding::Implemented(function));
    }

    fn register_placeholder(&mut self, name: &'static str) {
        self.functions
            .entry(name.to_string())
            .or_insert(FunctionBinding::NotImplemented(name));
    }

    fn register_date_functions(&mut self) {
        // EDATE
        self.register(FunctionDef {
            name: "EDATE",
            min_args: 2,
            max_args: Some(2),
            implementation: date::fn_edate,
            volatile: false,
        });

        // EOMONTH
        self.register(FunctionDef {
            name: "EOMONTH",
            min_args: 2,
            max_args: Some(2),
            implementation: date::fn_eomonth,
            volatile: false,
        });

        // YEARFRAC
        self.register(FunctionDef {
            name: "YEARFRAC",
            min_args: 2,
            max_args: Some(3),
            implementation: date::fn_yearfrac,
            volatile: false,
        });

        // WORKDAY
        self.register(FunctionDef {
            name: "WORKDAY",
            min_args: 2,
            max_args: Some(3),
            implementation: date::fn_workday,
            volatile: false,
        });

        // WORKDAY.INTL
        self.register(FunctionDef {
            name: "WORKDAY.INTL",
            min_args: 2,
            max_args: Some(4),
            implementation: date::fn_workday_intl,
            volatile: false,
        });

        // NETWORKDAYS
        self.register(FunctionDef {
            name: "NETWORKDAYS",
            min_args: 2,
            max_args: Some(3),
            implementation: date::fn_networkdays,
            volatile: false,
        });

        // NETWORKDAYS.INTL
        self.register(FunctionDef {
            name: "NETWORKDAYS.INTL",
            min_args: 2,
            max_args: Some(4),
            implementation: date::fn_networkdays_intl,
            volatile: false,
        });

        // WEEKNUM
        self.register(FunctionDef {
            name: "WEEKNUM",
            min_args: 1,
            max_args: Some(2),
            implementation: date::fn_weeknum,
            volatile: false,
        });
    }

    fn register_math_functions(&mut self, config: &ToolPakConfig) {
        // MROUND
        self.register(FunctionDef {
            name: "MROUND",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_mround,
            volatile: false,
        });

        // RANDBETWEEN (volatile, owns its generator)
        self.register_function("RANDBETWEEN", Box::new(math::RandBetween::new(config.rng_seed)));

        // QUOTIENT
        self.register(FunctionDef {
            name: "QUOTIENT",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_quotient,
            volatile: false,
        });

        // GCD
        self.register(FunctionDef {
            name: "GCD",
            min_args: 1,
            max_args: None,
            implementation: math::fn_gcd,
            volatile: false,
        });

        // LCM
        self.register(FunctionDef {
            name: "LCM",
            min_args: 1,
            max_args: None,
            implementation: math::fn_lcm,
            volatile: false,
        });

        // FACTDOUBLE
        self.register(FunctionDef {
            name: "FACTDOUBLE",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_factdouble,
            volatile: false,
        });

        // SQRTPI
        self.register(FunctionDef {
            name: "SQRTPI",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sqrtpi,
            volatile: false,
        });
    }

    fn register_info_functions(&mut self) {
        // ISEVEN
        self.register(FunctionDef {
            name: "ISEVEN",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_iseven,
            volatile: false,
        });

        // ISODD
        self.register(FunctionDef {
            name: "ISODD",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_isodd,
            volatile: false,
        });
    }

    fn register_logical_functions(&mut self) {
        // IFERROR
        self.register(FunctionDef {
            name: "IFERROR",
            min_args: 2,
            max_args: Some(2),
            implementation: logical::fn_iferror,
            volatile: false,
        });

        // IFNA
        self.register(FunctionDef {
            name: "IFNA",
            min_args: 2,
            max_args: Some(2),
            implementation: logical::fn_ifna,
            volatile: false,
        });

        // SWITCH
        self.register(FunctionDef {
            name: "SWITCH",
            min_args: 3,
            max_args: None,
            implementation: logical::fn_switch,
            volatile: false,
        });

        // IFS
        self.register(FunctionDef {
            name: "IFS",
            min_args: 2,
            max_args: None,
            implementation: logical::fn_ifs,
            volatile: false,
        });
    }

    fn register_text_functions(&mut self) {
        // TEXTJOIN
        self.register(FunctionDef {
            name: "TEXTJOIN",
            min_args: 3,
            max_args: None,
            implementation: text::fn_textjoin,
            volatile: false,
        });

        // CONCAT
        self.register(FunctionDef {
            name: "CONCAT",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concat,
            volatile: false,
        });
    }

    fn register_statistical_functions(&mut self) {
        // MAXIFS
        self.register(FunctionDef {
            name: "MAXIFS",
            min_args: 3,
            max_args: None,
            implementation: statistical::fn_maxifs,
            volatile: false,
        });

        // MINIFS
        self.register(FunctionDef {
            name: "MINIFS",
            min_args: 3,
            max_args: None,
            implementation: statistical::fn_minifs,
            volatile: false,
        });
    }

    fn register_lookup_functions(&mut self) {
        // XLOOKUP
        self.register(FunctionDef {
            name: "XLOOKUP",
            min_args: 3,
            max_args: Some(6),
            implementation: lookup::fn_xlookup,
            volatile: false,
        });

        // XMATCH
        self.register(FunctionDef {
            name: "XMATCH",
            min_args: 2,
            max_args: Some(4),
            implementation: lookup::fn_xmatch,
            volatile: false,
        });
    }

    fn register_engineering_functions(&mut self) {
        // DELTA
        self.register(FunctionDef {
            name: "DELTA",
            min_args: 1,
            max_args: Some(2),
            implementation: engineering::fn_delta,
            volatile: false,
        });

        // GESTEP
        self.register(FunctionDef {
            name: "GESTEP",
            min_args: 1,
            max_args: Some(2),
            implementation: engineering::fn_gestep,
            volatile: false,
        });
    }

    fn register_placeholders(&mut self) {
        for name in NOT_IMPLEMENTED {
            self.register_placeholder(name);
        }
    }
}

impl Default for AnalysisToolPak {
    fn default() -> Self {
        Self::new()
    }
}

impl UdfFinder for AnalysisToolPak {
    fn find_function(&self, name: &str) -> Option<&FunctionBinding> {
        self.get(name)
    }
}

impl fmt::Debug for AnalysisToolPak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisToolPak")
            .field("functions", &self.functions.len())
            .finish()
    }
}

/// Analysis ToolPak names recognized without an implementation
const NOT_IMPLEMENTED: [&str; 76] = [
    "ACCRINT",
    "ACCRINTM",
    "AMORDEGRC",
    "AMORLINC",
    "BESSELI",
    "BESSELJ",
    "BESSELK",
    "BESSELY",
    "BIN2DEC",
    "BIN2HEX",
    "BIN2OCT",
    "COMPLEX",
    "CONVERT",
    "COUPDAYBS",
    "COUPDAYS",
    "COUPDAYSNC",
    "COUPNCD",
    "COUPNUM",
    "COUPPCD",
    "CUMIPMT",
    "CUMPRINC",
    "DEC2BIN",
    "DEC2HEX",
    "DEC2OCT",
    "DISC",
    "DOLLARDE",
    "DOLLARFR",
    "DURATION",
    "EFFECT",
    "ERF",
    "ERFC",
    "FVSCHEDULE",
    "HEX2BIN",
    "HEX2DEC",
    "HEX2OCT",
    "IMABS",
    "IMAGINARY",
    "IMARGUMENT",
    "IMCONJUGATE",
    "IMCOS",
    "IMDIV",
    "IMEXP",
    "IMLN",
    "IMLOG10",
    "IMLOG2",
    "IMPOWER",
    "IMPRODUCT",
    "IMREAL",
    "IMSIN",
    "IMSQRT",
    "IMSUB",
    "IMSUM",
    "INTRATE",
    "MDURATION",
    "MULTINOMIAL",
    "NOMINAL",
    "OCT2BIN",
    "OCT2DEC",
    "OCT2HEX",
    "ODDFPRICE",
    "ODDFYIELD",
    "ODDLPRICE",
    "ODDLYIELD",
    "PRICE",
    "PRICEDISC",
    "PRICEMAT",
    "RECEIVED",
    "SERIESSUM",
    "TBILLEQ",
    "TBILLPRICE",
    "TBILLYIELD",
    "XIRR",
    "XNPV",
    "YIELD",
    "YIELDDISC",
    "YIELDMAT",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arguments_truncate_toward_zero() {
        let ctx = OperationEvaluationContext::simple();
        let args = [
            ValueEval::Number(-1.5),
            ValueEval::Number(2.9),
            ValueEval::Number(f64::NAN),
            ValueEval::Number(3e9),
        ];
        assert_eq!(arg_int(&args, 0, &ctx), Ok(-1));
        assert_eq!(arg_int(&args, 1, &ctx), Ok(2));
        assert_eq!(arg_int(&args, 2, &ctx), Err(CellError::Num));
        assert_eq!(arg_int(&args, 3, &ctx), Err(CellError::Num));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = AnalysisToolPak::new();
        assert!(table.is_implemented("edate"));
        assert!(table.is_implemented("Workday.Intl"));
        assert!(table.get("NOSUCHFUNCTION").is_none());
    }

    #[test]
    fn test_placeholders_are_distinct_from_unknown_names() {
        let table = AnalysisToolPak::new();
        let ctx = OperationEvaluationContext::simple();
        let args = [ValueEval::Number(1.0)];

        assert!(!table.is_implemented("BESSELJ"));
        assert!(matches!(
            table.invoke("besselj", &args, &ctx),
            Err(FormulaError::NotImplemented(name)) if name == "BESSELJ"
        ));
        assert!(matches!(
            table.invoke("FOO", &args, &ctx),
            Err(FormulaError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_arity_is_checked_before_evaluation() {
        let table = AnalysisToolPak::new();
        let ctx = OperationEvaluationContext::simple();
        assert_eq!(
            table.invoke("MROUND", &[ValueEval::Number(1.0)], &ctx).unwrap(),
            ValueEval::Error(CellError::Value)
        );
        assert_eq!(
            table
                .invoke("ISEVEN", &[ValueEval::Number(1.0), ValueEval::Number(2.0)], &ctx)
                .unwrap(),
            ValueEval::Error(CellError::Value)
        );
    }

    #[test]
    fn test_volatility() {
        let table = AnalysisToolPak::new();
        let volatile = |name: &str| match table.get(name) {
            Some(FunctionBinding::Implemented(f)) => f.is_volatile(),
            _ => panic!("{name} should be implemented"),
        };
        assert!(volatile("RANDBETWEEN"));
        assert!(!volatile("XLOOKUP"));
    }

    #[test]
    fn test_function_names_are_upper_case_and_sorted() {
        let table = AnalysisToolPak::new();
        let names = table.function_names();
        assert_eq!(names.len(), table.len());
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert!(names.iter().all(|n| *n == n.to_uppercase()));
    }
}
