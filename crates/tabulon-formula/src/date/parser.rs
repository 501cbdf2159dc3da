//! Date text parsing
//!
//! Only the unambiguous `YYYY-MM-DD` / `YYYY/MM/DD` layout is understood. Layouts that
//! start with a day or month (`MM/DD/YYYY` vs `DD/MM/YYYY`, two-digit years) depend on
//! the locale and are reported as [`FormulaError::UnsupportedDateFormat`] instead of
//! guessing.

use super::SimpleDate;
use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex;
use tabulon_core::CellError;

/// Parse date text such as `"2024-03-15"` or `"2024/3/15 10:30"`
///
/// A trailing time-of-day component is ignored. Text that is not three numeric fields
/// separated by `-` or `/`, or whose fields are implausible, is `#VALUE!`.
pub fn parse_date(text: &str) -> FormulaResult<SimpleDate> {
    let trimmed = text.trim();
    let parts: Vec<&str> = regex!(r"[-/]").split(trimmed).collect();
    if parts.len() != 3 {
        return Err(CellError::Value.into());
    }

    // "2024-03-15 10:30:00" -> "15"
    let last = parts[2].split_whitespace().next().unwrap_or("");

    let f0 = parse_field(parts[0])?;
    let f1 = parse_field(parts[1])?;
    let f2 = parse_field(last)?;

    if f0 > 12 && f1 > 12 && f2 > 12 {
        return Err(CellError::Value.into());
    }

    if (1900..9999).contains(&f0) {
        let month = u32::try_from(f1).map_err(|_| CellError::Value)?;
        let day = u32::try_from(f2).map_err(|_| CellError::Value)?;
        return Ok(SimpleDate::new(f0, month, day)?);
    }

    Err(FormulaError::UnsupportedDateFormat(text.to_string()))
}

fn parse_field(field: &str) -> FormulaResult<i32> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CellError::Value.into());
    }
    field.parse().map_err(|_| CellError::Value.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> (i32, u32, u32) {
        let d = parse_date(text).unwrap();
        (d.year, d.month, d.day)
    }

    #[test]
    fn test_iso_layouts() {
        assert_eq!(parsed("2024-03-15"), (2024, 3, 15));
        assert_eq!(parsed("2024/3/5"), (2024, 3, 5));
        assert_eq!(parsed(" 1999-12-31 23:59:59 "), (1999, 12, 31));
    }

    #[test]
    fn test_invalid_text_is_value_error() {
        for text in ["hello", "2024-03", "2024-13-01", "2024-02-30", "a-b-c", "13/14/15"] {
            let err = parse_date(text).unwrap_err();
            assert_eq!(err.cell_error(), CellError::Value, "{text}");
            assert!(matches!(err, FormulaError::Cell(CellError::Value)), "{text}");
        }
    }

    #[test]
    fn test_ambiguous_layouts_are_unsupported() {
        assert!(matches!(
            parse_date("03/15/2024"),
            Err(FormulaError::UnsupportedDateFormat(_))
        ));
        assert!(matches!(
            parse_date("1/2/24"),
            Err(FormulaError::UnsupportedDateFormat(_))
        ));
    }
}
