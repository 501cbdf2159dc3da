//! Cells: values, error codes, addresses and sparse storage

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange};
pub use storage::CellStorage;
pub use value::{CellError, CellValue};
