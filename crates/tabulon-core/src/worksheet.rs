//! A single sheet: a name plus a sparse grid

use crate::cell::{CellAddress, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value at an A1 address
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let cell = CellAddress::parse(address)?;
        Ok(self.get_value_at(cell.row, cell.col))
    }

    /// Value at 0-based coordinates; unset cells read as [`CellValue::Empty`]
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.get(row, col).cloned().unwrap_or_default()
    }

    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let cell = CellAddress::parse(address)?;
        self.set_cell_value_at(cell.row, cell.col, value)
    }

    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        self.cells.set(row, col, value.into());
        Ok(())
    }

    /// Write values downwards from `address`
    pub fn set_column_values<V, I>(&mut self, address: &str, values: I) -> Result<()>
    where
        V: Into<CellValue>,
        I: IntoIterator<Item = V>,
    {
        let start = CellAddress::parse(address)?;
        for (offset, value) in (0u32..).zip(values) {
            let row = start
                .row
                .checked_add(offset)
                .ok_or(Error::RowOutOfBounds(u32::MAX, MAX_ROWS - 1))?;
            self.set_cell_value_at(row, start.col, value)?;
        }
        Ok(())
    }

    /// Write values rightwards from `address`
    pub fn set_row_values<V, I>(&mut self, address: &str, values: I) -> Result<()>
    where
        V: Into<CellValue>,
        I: IntoIterator<Item = V>,
    {
        let start = CellAddress::parse(address)?;
        for (offset, value) in (0u16..).zip(values) {
            let col = start
                .col
                .checked_add(offset)
                .ok_or(Error::ColumnOutOfBounds(u16::MAX, MAX_COLS - 1))?;
            self.set_cell_value_at(start.row, col, value)?;
        }
        Ok(())
    }

    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let cell = CellAddress::parse(address)?;
        self.cells.remove(cell.row, cell.col);
        Ok(())
    }

    /// Smallest range holding every non-empty cell
    pub fn used_range(&self) -> Option<CellRange> {
        let (first_row, first_col, last_row, last_col) = self.cells.used_bounds()?;
        Some(CellRange::from_indices(first_row, first_col, last_row, last_col))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
