//! Tests for building workbooks and reading cells back

use pretty_assertions::assert_eq;
use tabulon_core::{CellError, CellRange, CellValue, Error, Workbook};

/// Values written by address come back by index
#[test]
fn test_write_and_read_cells() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();

    sheet.set_column_values("B2", [1.0, 2.0, 3.0]).unwrap();
    sheet.set_row_values("C2", ["x", "y"]).unwrap();
    sheet.set_cell_value("A1", CellError::Na).unwrap();

    assert_eq!(sheet.get_value_at(3, 1), CellValue::Number(3.0));
    assert_eq!(sheet.get_value_at(1, 3), CellValue::text("y"));
    assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Error(CellError::Na));
    assert_eq!(sheet.get_value_at(50, 50), CellValue::Empty);
    assert_eq!(sheet.used_range(), Some(CellRange::parse("A1:D4").unwrap()));
}

/// Clearing a cell shrinks the used range
#[test]
fn test_clear_cell() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("C3", 2.0).unwrap();

    sheet.clear_cell("C3").unwrap();
    assert_eq!(sheet.cell_count(), 1);
    assert_eq!(sheet.used_range(), Some(CellRange::parse("A1").unwrap()));
}

/// Sheet names are validated and unique regardless of case
#[test]
fn test_sheet_names() {
    let mut wb = Workbook::new();
    assert_eq!(wb.add_worksheet_with_name("Data").unwrap(), 1);
    assert!(matches!(
        wb.add_worksheet_with_name("DATA"),
        Err(Error::DuplicateSheetName(_))
    ));
    assert!(matches!(
        wb.add_worksheet_with_name("a/b"),
        Err(Error::InvalidSheetName(_))
    ));
    assert_eq!(wb.sheet_index("Data"), Some(1));
    assert!(matches!(wb.remove_worksheet(5), Err(Error::SheetOutOfBounds(5, 2))));
}

/// Malformed addresses are rejected
#[test]
fn test_bad_address() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    assert!(matches!(
        sheet.set_cell_value("1A", 1.0),
        Err(Error::InvalidAddress(_))
    ));
}
