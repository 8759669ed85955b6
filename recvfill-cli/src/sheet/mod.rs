//! Workbook access for billing spreadsheets
//!
//! Reading goes through calamine (`.xls` and `.xlsx`); processed row tables are
//! exported with rust_xlsxwriter.

mod cell;
mod columns;
mod error;
mod processed;
mod reader;
mod table;

pub use cell::{Cell, format_number};
pub use columns::{ColumnSelection, column_letter, parse_column_letters};
pub use error::SheetError;
pub use processed::{ColumnLabels, read_processed_excel, write_processed_excel};
pub use reader::{PreprocessOptions, ReadOptions, SheetRef, SpreadsheetReader};
pub use table::{SheetInfo, Table};
