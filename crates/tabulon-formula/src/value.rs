//! Evaluation values
//!
//! Every function argument and every function result is a [`ValueEval`]. Scalars are
//! carried by value; cell references and areas are lazy handles over a [`CellSource`]
//! and only read the grid when a function asks for a cell.

use std::fmt;

use crate::error::FormulaResult;
use tabulon_core::{CellError, CellRange, CellValue, Workbook};

/// Read access to the workbook grid the engine evaluates against
pub trait CellSource {
    /// Value of a cell; cells on a missing sheet read as `#REF!`
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> CellValue;

    fn sheet_count(&self) -> usize;
}

impl CellSource for Workbook {
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> CellValue {
        match self.worksheet(sheet) {
            Some(ws) => ws.get_value_at(row, col),
            None => CellValue::Error(CellError::Ref),
        }
    }

    fn sheet_count(&self) -> usize {
        Workbook::sheet_count(self)
    }
}

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEval<'a> {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CellError),
    /// An empty cell
    Blank,
    /// An argument position left empty in the call, e.g. the third argument of `F(1,,2)`
    MissingArg,
    Ref(RefEval<'a>),
    Area(AreaEval<'a>),
    /// An in-memory block of values (array constants and array results)
    Array(ArrayEval<'a>),
}

impl<'a> ValueEval<'a> {
    pub fn text<S: Into<String>>(s: S) -> Self {
        ValueEval::Text(s.into())
    }

    pub fn from_cell(value: CellValue) -> Self {
        match value {
            CellValue::Empty => ValueEval::Blank,
            CellValue::Number(n) => ValueEval::Number(n),
            CellValue::Text(s) => ValueEval::Text(s.to_string()),
            CellValue::Boolean(b) => ValueEval::Boolean(b),
            CellValue::Error(e) => ValueEval::Error(e),
        }
    }

    /// Convert a scalar result into a storable cell value
    ///
    /// References are dereferenced; multi-cell results store their top-left value.
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            ValueEval::Number(n) => CellValue::Number(*n),
            ValueEval::Text(s) => CellValue::text(s),
            ValueEval::Boolean(b) => CellValue::Boolean(*b),
            ValueEval::Error(e) => CellValue::Error(*e),
            ValueEval::Blank | ValueEval::MissingArg => CellValue::Empty,
            ValueEval::Ref(r) => r.inner_value().to_cell_value(),
            ValueEval::Area(_) | ValueEval::Array(_) => match self.as_two_d() {
                Some(grid) if grid.width() > 0 && grid.height() > 0 => {
                    grid.value(0, 0).to_cell_value()
                }
                _ => CellValue::Error(CellError::Value),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValueEval::Error(_))
    }

    pub fn get_error(&self) -> Option<CellError> {
        match self {
            ValueEval::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ValueEval::MissingArg)
    }

    /// View areas and arrays through the common two-dimensional interface
    pub fn as_two_d(&self) -> Option<&dyn TwoDEval<'a>> {
        match self {
            ValueEval::Area(area) => Some(area),
            ValueEval::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<f64> for ValueEval<'_> {
    fn from(n: f64) -> Self {
        ValueEval::Number(n)
    }
}

impl From<bool> for ValueEval<'_> {
    fn from(b: bool) -> Self {
        ValueEval::Boolean(b)
    }
}

impl From<&str> for ValueEval<'_> {
    fn from(s: &str) -> Self {
        ValueEval::Text(s.to_string())
    }
}

impl From<CellError> for ValueEval<'_> {
    fn from(e: CellError) -> Self {
        ValueEval::Error(e)
    }
}

/// A rectangular block of values addressed by offsets relative to its top-left cell
pub trait TwoDEval<'a> {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Value at a relative `(row, col)` offset
    fn value(&self, row: usize, col: usize) -> ValueEval<'a>;

    fn is_row(&self) -> bool {
        self.height() == 1
    }

    fn is_column(&self) -> bool {
        self.width() == 1
    }

    /// All values in row-major order
    fn values(&self) -> Vec<ValueEval<'a>> {
        let mut out = Vec::with_capacity(self.width() * self.height());
        for row in 0..self.height() {
            for col in 0..self.width() {
                out.push(self.value(row, col));
            }
        }
        out
    }
}

/// A lazy reference to a single cell
#[derive(Clone, Copy)]
pub struct RefEval<'a> {
    source: &'a dyn CellSource,
    sheet: usize,
    row: u32,
    col: u16,
}

impl<'a> RefEval<'a> {
    pub fn new(source: &'a dyn CellSource, sheet: usize, row: u32, col: u16) -> Self {
        Self {
            source,
            sheet,
            row,
            col,
        }
    }

    /// Build a reference from A1 notation, e.g. `"B7"`
    pub fn from_a1(source: &'a dyn CellSource, sheet: usize, address: &str) -> FormulaResult<Self> {
        let addr = tabulon_core::CellAddress::parse(address)?;
        Ok(Self::new(source, sheet, addr.row, addr.col))
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn column(&self) -> u16 {
        self.col
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet
    }

    /// Read the referenced cell
    pub fn inner_value(&self) -> ValueEval<'a> {
        ValueEval::from_cell(self.source.cell_value(self.sheet, self.row, self.col))
    }

    /// The referenced cell as a 1x1 area
    pub fn to_area(&self) -> AreaEval<'a> {
        let range = CellRange::from_indices(self.row, self.col, self.row, self.col);
        AreaEval::new(self.source, self.sheet, range)
    }
}

impl fmt::Debug for RefEval<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RefEval(sheet {}, {})",
            self.sheet,
            tabulon_core::CellAddress::new(self.row, self.col)
        )
    }
}

impl PartialEq for RefEval<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.sheet == other.sheet && self.row == other.row && self.col == other.col
    }
}

/// A lazy handle over a rectangular region of a sheet
///
/// Always satisfies `last_row >= first_row` and `last_col >= first_col`.
#[derive(Clone, Copy)]
pub struct AreaEval<'a> {
    source: &'a dyn CellSource,
    sheet: usize,
    range: CellRange,
}

impl<'a> AreaEval<'a> {
    pub fn new(source: &'a dyn CellSource, sheet: usize, range: CellRange) -> Self {
        // CellRange keeps its corners ordered
        Self {
            source,
            sheet,
            range,
        }
    }

    /// Build an area from A1 notation, e.g. `"A1:C10"`
    pub fn from_a1(source: &'a dyn CellSource, sheet: usize, range: &str) -> FormulaResult<Self> {
        Ok(Self::new(source, sheet, CellRange::parse(range)?))
    }

    pub fn first_row(&self) -> u32 {
        self.range.start.row
    }

    pub fn last_row(&self) -> u32 {
        self.range.end.row
    }

    pub fn first_column(&self) -> u16 {
        self.range.start.col
    }

    pub fn last_column(&self) -> u16 {
        self.range.end.col
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet
    }

    pub fn range(&self) -> CellRange {
        self.range
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row() && row <= self.last_row()
    }

    pub fn contains_column(&self, col: u16) -> bool {
        col >= self.first_column() && col <= self.last_column()
    }

    /// Value at absolute sheet coordinates; the caller must stay inside the area
    pub fn absolute_value(&self, row: u32, col: u16) -> ValueEval<'a> {
        ValueEval::from_cell(self.source.cell_value(self.sheet, row, col))
    }

    /// Sub-area from relative, inclusive row and column bounds
    ///
    /// Returns `None` when the bounds fall outside this area.
    pub fn offset(
        &self,
        first_row: usize,
        last_row: usize,
        first_col: usize,
        last_col: usize,
    ) -> Option<AreaEval<'a>> {
        if first_row > last_row
            || first_col > last_col
            || last_row >= self.height()
            || last_col >= self.width()
        {
            return None;
        }
        let range = CellRange::from_indices(
            self.first_row() + first_row as u32,
            self.first_column() + first_col as u16,
            self.first_row() + last_row as u32,
            self.first_column() + last_col as u16,
        );
        Some(Self::new(self.source, self.sheet, range))
    }

    pub fn row(&self, row: usize) -> Option<AreaEval<'a>> {
        self.offset(row, row, 0, self.width().saturating_sub(1))
    }

    pub fn column(&self, col: usize) -> Option<AreaEval<'a>> {
        self.offset(0, self.height().saturating_sub(1), col, col)
    }
}

impl<'a> TwoDEval<'a> for AreaEval<'a> {
    fn width(&self) -> usize {
        self.range.col_count() as usize
    }

    fn height(&self) -> usize {
        self.range.row_count() as usize
    }

    fn value(&self, row: usize, col: usize) -> ValueEval<'a> {
        self.absolute_value(
            self.first_row() + row as u32,
            self.first_column() + col as u16,
        )
    }
}

impl fmt::Debug for AreaEval<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AreaEval(sheet {}, {})", self.sheet, self.range)
    }
}

impl PartialEq for AreaEval<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.sheet == other.sheet && self.range == other.range
    }
}

/// An in-memory rectangular block of values, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEval<'a> {
    width: usize,
    height: usize,
    values: Vec<ValueEval<'a>>,
}

impl<'a> ArrayEval<'a> {
    /// Build an array from rows; ragged rows are padded with `#N/A` like Excel does
    pub fn from_rows(rows: Vec<Vec<ValueEval<'a>>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut values = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, ValueEval::Error(CellError::Na));
            values.extend(row);
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub fn row(values: Vec<ValueEval<'a>>) -> Self {
        Self::from_rows(vec![values])
    }

    pub fn column(values: Vec<ValueEval<'a>>) -> Self {
        Self::from_rows(values.into_iter().map(|v| vec![v]).collect())
    }
}

impl<'a> TwoDEval<'a> for ArrayEval<'a> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn value(&self, row: usize, col: usize) -> ValueEval<'a> {
        self.values
            .get(row * self.width + col)
            .cloned()
            .unwrap_or(ValueEval::Error(CellError::Ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Workbook {
        let mut wb = Workbook::new();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", 1.0).unwrap();
        sheet.set_cell_value("B1", "two").unwrap();
        sheet.set_cell_value("A2", true).unwrap();
        sheet.set_cell_value("B3", CellError::Div0).unwrap();
        wb
    }

    #[test]
    fn test_area_reads_lazily() {
        let wb = sample_book();
        let area = AreaEval::from_a1(&wb, 0, "A1:B3").unwrap();

        assert_eq!(area.width(), 2);
        assert_eq!(area.height(), 3);
        assert_eq!(area.value(0, 0), ValueEval::Number(1.0));
        assert_eq!(area.value(0, 1), ValueEval::text("two"));
        assert_eq!(area.value(1, 0), ValueEval::Boolean(true));
        assert_eq!(area.value(1, 1), ValueEval::Blank);
        assert_eq!(area.value(2, 1), ValueEval::Error(CellError::Div0));
    }

    #[test]
    fn test_area_offsets() {
        let wb = sample_book();
        let area = AreaEval::from_a1(&wb, 0, "A1:B3").unwrap();

        let row = area.row(0).unwrap();
        assert!(row.is_row());
        assert_eq!(row.range().to_string(), "A1:B1");

        let col = area.column(1).unwrap();
        assert!(col.is_column());
        assert_eq!(col.range().to_string(), "B1:B3");

        assert!(area.row(3).is_none());
        assert!(area.offset(1, 0, 0, 0).is_none());
    }

    #[test]
    fn test_ref_on_missing_sheet_is_ref_error() {
        let wb = sample_book();
        let r = RefEval::from_a1(&wb, 4, "A1").unwrap();
        assert_eq!(r.inner_value(), ValueEval::Error(CellError::Ref));
    }

    #[test]
    fn test_array_padding_and_cell_conversion() {
        let array = ArrayEval::from_rows(vec![
            vec![ValueEval::Number(1.0), ValueEval::Number(2.0)],
            vec![ValueEval::Number(3.0)],
        ]);
        assert_eq!(array.width(), 2);
        assert_eq!(array.value(1, 1), ValueEval::Error(CellError::Na));

        let value = ValueEval::Array(array);
        assert_eq!(value.to_cell_value(), CellValue::Number(1.0));
        assert_eq!(ValueEval::Blank.to_cell_value(), CellValue::Empty);
    }
}
