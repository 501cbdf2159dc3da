//! Formula error types

use tabulon_core::CellError;
use thiserror::Error;

/// Result type for host-facing formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Result type used inside evaluators
///
/// The error channel carries the spreadsheet error code; evaluators turn it into a
/// [`ValueEval::Error`](crate::ValueEval::Error) before returning to their caller.
pub type EvalResult<T> = std::result::Result<T, CellError>;

/// Errors surfaced to the code that drives evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// The function name is a known Analysis ToolPak function without an implementation
    #[error("Function {0} is recognized but not implemented")]
    NotImplemented(String),

    /// The function name is not known to this table
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Date text uses a layout that cannot be interpreted unambiguously
    #[error("Unable to determine date format for text '{0}'")]
    UnsupportedDateFormat(String),

    /// Reference text could not be resolved against the workbook
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A spreadsheet error raised while evaluating
    #[error("Evaluation error: {0}")]
    Cell(#[from] CellError),
}

impl FormulaError {
    /// The spreadsheet error a cell displays for this failure
    pub fn cell_error(&self) -> CellError {
        match self {
            FormulaError::Cell(e) => *e,
            FormulaError::UnknownFunction(_) => CellError::Name,
            FormulaError::InvalidReference(_) => CellError::Ref,
            FormulaError::NotImplemented(_) | FormulaError::UnsupportedDateFormat(_) => {
                CellError::Value
            }
        }
    }
}

impl From<tabulon_core::Error> for FormulaError {
    fn from(err: tabulon_core::Error) -> Self {
        FormulaError::InvalidReference(err.to_string())
    }
}
