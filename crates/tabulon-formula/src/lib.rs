//! # tabulon-formula
//!
//! Analysis ToolPak function evaluation for tabulon.
//!
//! This crate provides:
//! - The evaluation value model ([`ValueEval`]) with lazy cell and area references
//! - Operand resolution and coercion shared by all functions
//! - Date arithmetic in the 1900 date system (YEARFRAC, WORKDAY, NETWORKDAYS)
//! - The lookup match engine behind XLOOKUP and XMATCH
//! - [`AnalysisToolPak`], the name-indexed table of extended functions
//!
//! ## Example
//!
//! ```rust
//! use tabulon_formula::{AnalysisToolPak, OperationEvaluationContext, ValueEval};
//!
//! let toolpak = AnalysisToolPak::new();
//! let ctx = OperationEvaluationContext::simple();
//! let args = [ValueEval::Number(10.0), ValueEval::Number(3.0)];
//!
//! let result = toolpak.invoke("MROUND", &args, &ctx).unwrap();
//! assert_eq!(result, ValueEval::Number(9.0));
//! ```

pub mod context;
pub mod date;
pub mod error;
pub mod functions;
pub mod lookup;
pub mod operand;
pub mod value;
pub mod wildcard;

pub use context::{EvaluationMode, OperationEvaluationContext};
pub use error::{EvalResult, FormulaError, FormulaResult};
pub use functions::{
    AnalysisToolPak, FreeRefFunction, FunctionBinding, FunctionDef, ToolPakConfig, UdfFinder,
};
pub use value::{AreaEval, ArrayEval, CellSource, RefEval, TwoDEval, ValueEval};
