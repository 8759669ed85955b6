//! Errors raised while opening, reading or writing workbooks

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetError {
    /// Input file does not exist
    NotFound { path: PathBuf },
    /// Extension is not `.xls` or `.xlsx`
    UnsupportedFormat { path: PathBuf, extension: String },
    /// The file exists but calamine could not parse it
    Open { path: PathBuf, message: String },
    /// Sheet name or index is not in the workbook
    InvalidSheet {
        requested: String,
        available: Vec<String>,
    },
    /// Column letter spec such as `"C,T,U"` could not be parsed
    InvalidColumnSpec { spec: String, reason: String },
    /// A column requested by name is not in the header row
    UnknownColumn {
        name: String,
        available: Vec<String>,
    },
    /// Reading a sheet's cell range failed
    Read { sheet: String, message: String },
    /// Saving a workbook failed
    Write { path: PathBuf, message: String },
    /// A cell in a processed file does not hold the expected value
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetError::NotFound { path } => {
                write!(f, "file not found: {}", path.display())
            }
            SheetError::UnsupportedFormat { path, extension } => {
                let extension = if extension.is_empty() {
                    "(none)"
                } else {
                    extension.as_str()
                };
                write!(
                    f,
                    "unsupported file format '{}' for {}, use .xlsx or .xls",
                    extension,
                    path.display()
                )
            }
            SheetError::Open { path, message } => {
                write!(f, "failed to open workbook {}: {}", path.display(), message)
            }
            SheetError::InvalidSheet {
                requested,
                available,
            } => {
                if available.is_empty() {
                    write!(f, "sheet {} does not exist, the workbook has no sheets", requested)
                } else {
                    write!(
                        f,
                        "sheet {} does not exist, valid indexes are 0-{} ({})",
                        requested,
                        available.len() - 1,
                        available.join(", ")
                    )
                }
            }
            SheetError::InvalidColumnSpec { spec, reason } => {
                write!(f, "invalid column selection '{}': {}", spec, reason)
            }
            SheetError::UnknownColumn { name, available } => {
                write!(
                    f,
                    "column '{}' not found, available columns: {}",
                    name,
                    available.join(", ")
                )
            }
            SheetError::Read { sheet, message } => {
                write!(f, "failed to read sheet '{}': {}", sheet, message)
            }
            SheetError::Write { path, message } => {
                write!(f, "failed to write {}: {}", path.display(), message)
            }
            SheetError::InvalidValue { row, column, value } => {
                write!(
                    f,
                    "row {}: column '{}' has invalid value '{}'",
                    row, column, value
                )
            }
        }
    }
}

impl std::error::Error for SheetError {}
