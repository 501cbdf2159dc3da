//! Cell contents and spreadsheet error codes

use std::fmt;
use std::sync::Arc;

/// What a cell holds
///
/// Dates are stored as their serial number, like every other number.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    /// Text, shared cheaply between reads
    Text(Arc<str>),
    Boolean(bool),
    Error(CellError),
}

impl CellValue {
    pub fn text<S: AsRef<str>>(s: S) -> Self {
        CellValue::Text(Arc::from(s.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn error(&self) -> Option<CellError> {
        match self {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(Arc::from(s))
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Spreadsheet error values
///
/// The closed set of codes a formula can produce. An error travels unchanged through
/// composing functions unless one of them handles it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// `#NULL!`
    Null,
    /// `#DIV/0!`
    Div0,
    /// `#VALUE!`: wrong argument type or arity
    Value,
    /// `#REF!`
    Ref,
    /// `#NAME?`
    Name,
    /// `#NUM!`: argument outside the function's domain
    Num,
    /// `#N/A`: lookup miss
    Na,
}

const ERROR_TEXT: [(CellError, &str); 7] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
];

impl CellError {
    /// Every error code
    pub const ALL: [CellError; 7] = [
        CellError::Null,
        CellError::Div0,
        CellError::Value,
        CellError::Ref,
        CellError::Name,
        CellError::Num,
        CellError::Na,
    ];

    /// Text shown in a cell
    pub fn as_str(&self) -> &'static str {
        ERROR_TEXT
            .iter()
            .find(|(e, _)| e == self)
            .map_or("#VALUE!", |(_, text)| text)
    }

    /// Error code for its cell text, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        ERROR_TEXT
            .iter()
            .find(|(_, text)| text.eq_ignore_ascii_case(s.trim()))
            .map(|(e, _)| *e)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for CellError {}
