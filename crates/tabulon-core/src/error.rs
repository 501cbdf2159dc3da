//! Errors raised while building or addressing a workbook

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid cell address '{0}'")]
    InvalidAddress(String),

    #[error("row {0} is past the last row {1}")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is past the last column {1}")]
    ColumnOutOfBounds(u16, u16),

    #[error("no sheet at index {0} (workbook has {1})")]
    SheetOutOfBounds(usize, usize),

    #[error("invalid sheet name '{0}'")]
    InvalidSheetName(String),

    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),
}
