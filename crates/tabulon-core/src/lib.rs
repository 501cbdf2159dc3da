//! # tabulon-core
//!
//! Workbook and cell types for the tabulon spreadsheet library.
//!
//! This crate is the narrow data layer the formula engine reads from:
//! - [`CellValue`] - Values stored in cells (numbers, strings, booleans, errors)
//! - [`CellError`] - The spreadsheet error codes (`#VALUE!`, `#N/A`, ...)
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Workbook`], [`Worksheet`] - Sparse cell grids
//!
//! ## Example
//!
//! ```rust
//! use tabulon_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::text("World")).unwrap();
//!
//! assert_eq!(sheet.get_value_at(0, 1), CellValue::Number(42.0));
//! ```

pub mod cell;
pub mod error;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellError, CellRange, CellValue};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Longest sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;
