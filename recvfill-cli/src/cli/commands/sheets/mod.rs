//! Workbook inspection

pub mod handler;

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::output::OutputFormat;
use crate::sheet::SheetRef;

pub use handler::handle_sheets_command;

#[derive(Subcommand, Debug)]
pub enum SheetsCommands {
    /// List the sheets of a workbook
    List(ListArgs),
    /// Row and column counts, column types and empty cells of one sheet
    Info(InfoArgs),
    /// Print the cells of one sheet
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Workbook (.xls/.xlsx); defaults to [input] path
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Workbook (.xls/.xlsx); defaults to [input] path
    pub file: Option<PathBuf>,

    /// Sheet index (0-based) or name; defaults to [input] sheet
    #[arg(short, long)]
    pub sheet: Option<SheetRef>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Workbook (.xls/.xlsx); defaults to [input] path
    pub file: Option<PathBuf>,

    /// Sheet index (0-based) or name; defaults to [input] sheet
    #[arg(short, long)]
    pub sheet: Option<SheetRef>,

    /// Column letters to keep, e.g. "C,T,U" or "A:C"
    #[arg(short, long, conflicts_with = "names")]
    pub columns: Option<String>,

    /// Header names to keep, comma separated
    #[arg(long, value_delimiter = ',')]
    pub names: Option<Vec<String>>,

    /// Row used as column names, counted after --skip-rows
    #[arg(long, default_value_t = 0, conflicts_with = "no_header")]
    pub header: usize,

    /// Name columns by position instead of a header row
    #[arg(long)]
    pub no_header: bool,

    /// Leading rows to ignore
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    /// Drop empty rows and columns
    #[arg(long)]
    pub clean: bool,

    /// Value for cells still empty after --clean
    #[arg(long, requires = "clean")]
    pub fill_value: Option<String>,

    /// Rows to print, 0 for all
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
