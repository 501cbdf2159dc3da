//! Sparse cell storage

use std::collections::BTreeMap;

use super::CellValue;

/// Non-empty cells keyed by `(row, col)`, in row-major order
#[derive(Debug, Default)]
pub struct CellStorage {
    cells: BTreeMap<(u32, u16), CellValue>,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Store a value; [`CellValue::Empty`] removes the cell
    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellValue> {
        self.cells.remove(&(row, col))
    }

    /// `(min_row, min_col, max_row, max_col)` over the stored cells
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let (&(first_row, _), _) = self.cells.first_key_value()?;
        let (&(last_row, _), _) = self.cells.last_key_value()?;
        let (min_col, max_col) = self
            .cells
            .keys()
            .fold((u16::MAX, 0), |(lo, hi), &(_, col)| (lo.min(col), hi.max(col)));
        Some((first_row, min_col, last_row, max_col))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
