//! Criteria matching for MAXIFS, MINIFS and related functions
//!
//! Excel criteria can be:
//! - A number: exact match (e.g., 5)
//! - A text string: case-insensitive match (e.g., "apple")
//! - A comparison expression: ">5", ">=10", "<100", "<=50", "<>0", "=5", ">=b"
//! - Wildcards: "*" matches any characters, "?" matches single character, "~" escapes
//! - Empty string: matches empty cells

use crate::date::parse_date;
use crate::operand::parse_double;
use crate::value::ValueEval;
use crate::wildcard::WildcardPattern;
use std::cmp::Ordering;
use tabulon_core::CellError;

/// Criteria matcher for the *IFS family
/// Handles comparison operators, wildcards, and exact matching
#[derive(Debug)]
pub struct CriteriaMatcher {
    criteria_type: CriteriaType,
}

#[derive(Debug)]
enum CriteriaType {
    /// Exact number match
    Number(f64),
    /// Exact boolean match
    Boolean(bool),
    /// Comparison with number (operator, value)
    Comparison(ComparisonOp, f64),
    /// Comparison with text (operator, lowercased value)
    TextComparison(ComparisonOp, String),
    /// Text match (case-insensitive)
    Text(String),
    /// Text match with wildcards
    Wildcard(WildcardPattern),
    /// Same error value
    Error(CellError),
    /// Match empty values
    Empty,
    /// "<>": anything that is not empty
    NonEmpty,
    /// "<>text": anything the inner criteria rejects
    Not(Box<CriteriaType>),
}

#[derive(Debug, Clone, Copy)]
enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl ComparisonOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterEqual => ordering != Ordering::Less,
        }
    }
}

impl CriteriaMatcher {
    /// Create a new criteria matcher from an already dereferenced value
    pub fn new(criteria: &ValueEval<'_>) -> Self {
        let criteria_type = match criteria {
            ValueEval::Number(n) => CriteriaType::Number(*n),
            ValueEval::Boolean(b) => CriteriaType::Boolean(*b),
            ValueEval::Text(s) => Self::parse_string_criteria(s),
            ValueEval::Error(e) => CriteriaType::Error(*e),
            ValueEval::Ref(r) => return Self::new(&r.inner_value()),
            ValueEval::Blank | ValueEval::MissingArg => CriteriaType::Empty,
            // Arrays as criteria not supported
            ValueEval::Area(_) | ValueEval::Array(_) => CriteriaType::Error(CellError::Value),
        };

        Self { criteria_type }
    }

    fn parse_string_criteria(s: &str) -> CriteriaType {
        if s.is_empty() {
            return CriteriaType::Empty;
        }

        if let Some(ct) = Self::try_parse_comparison(s) {
            return ct;
        }

        let n = parse_double(s);
        if !n.is_nan() {
            return CriteriaType::Number(n);
        }
        if s.eq_ignore_ascii_case("TRUE") || s.eq_ignore_ascii_case("FALSE") {
            return CriteriaType::Boolean(s.eq_ignore_ascii_case("TRUE"));
        }
        if let Some(e) = CellError::parse(s) {
            return CriteriaType::Error(e);
        }

        match WildcardPattern::new(s) {
            Some(pattern) => CriteriaType::Wildcard(pattern),
            None => CriteriaType::Text(s.to_lowercase()),
        }
    }

    fn try_parse_comparison(s: &str) -> Option<CriteriaType> {
        // longer operators first
        let (op, rest) = if let Some(rest) = s.strip_prefix(">=") {
            (ComparisonOp::GreaterEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (ComparisonOp::LessEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<>") {
            (ComparisonOp::NotEqual, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (ComparisonOp::GreaterThan, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (ComparisonOp::LessThan, rest)
        } else if let Some(rest) = s.strip_prefix('=') {
            (ComparisonOp::Equal, rest)
        } else {
            return None;
        };

        if rest.is_empty() {
            return Some(match op {
                ComparisonOp::Equal => CriteriaType::Empty,
                ComparisonOp::NotEqual => CriteriaType::NonEmpty,
                // "<" or ">" alone compare against empty text
                _ => CriteriaType::TextComparison(op, String::new()),
            });
        }

        let n = parse_double(rest);
        if !n.is_nan() {
            return Some(CriteriaType::Comparison(op, n));
        }
        if let Ok(date) = parse_date(rest) {
            return Some(CriteriaType::Comparison(op, date.to_serial() as f64));
        }

        Some(match op {
            ComparisonOp::Equal => Self::parse_string_criteria(rest),
            ComparisonOp::NotEqual => {
                CriteriaType::Not(Box::new(Self::parse_string_criteria(rest)))
            }
            _ => CriteriaType::TextComparison(op, rest.to_lowercase()),
        })
    }

    /// Check if a value matches the criteria
    pub fn matches(&self, value: &ValueEval<'_>) -> bool {
        self.criteria_type.matches(value)
    }
}

impl CriteriaType {
    fn matches(&self, value: &ValueEval<'_>) -> bool {
        match self {
            CriteriaType::Number(criteria_num) => {
                // text "5" does not match the number 5
                matches!(value, ValueEval::Number(n) if (n - criteria_num).abs() < 1e-10)
            }

            CriteriaType::Boolean(b) => matches!(value, ValueEval::Boolean(v) if v == b),

            CriteriaType::Comparison(op, criteria_num) => match value {
                ValueEval::Number(n) => n
                    .partial_cmp(criteria_num)
                    .map(|ordering| op.holds(ordering))
                    .unwrap_or(false),
                // a number criterion is never equal to a non-number
                _ => matches!(op, ComparisonOp::NotEqual),
            },

            CriteriaType::TextComparison(op, text) => match value {
                ValueEval::Text(s) => op.holds(s.to_lowercase().as_str().cmp(text.as_str())),
                _ => matches!(op, ComparisonOp::NotEqual),
            },

            CriteriaType::Text(text) => {
                matches!(value, ValueEval::Text(s) if s.to_lowercase() == *text)
            }

            CriteriaType::Wildcard(pattern) => {
                matches!(value, ValueEval::Text(s) if pattern.matches(s))
            }

            CriteriaType::Error(e) => matches!(value, ValueEval::Error(v) if v == e),

            CriteriaType::Empty => {
                matches!(value, ValueEval::Blank | ValueEval::MissingArg)
                    || matches!(value, ValueEval::Text(s) if s.is_empty())
            }

            CriteriaType::NonEmpty => !matches!(value, ValueEval::Blank | ValueEval::MissingArg),

            CriteriaType::Not(inner) => !inner.matches(value),
        }
    }
}
