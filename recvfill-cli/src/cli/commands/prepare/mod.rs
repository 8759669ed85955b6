//! Read, clean and export the billing sheet

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::cli::output::OutputFormat;
use crate::sheet::SheetRef;

pub use handler::handle_prepare_command;

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Raw billing workbook; defaults to [input] path
    pub file: Option<PathBuf>,

    /// Sheet index (0-based) or name; defaults to [input] sheet
    #[arg(short, long)]
    pub sheet: Option<SheetRef>,

    /// Item, quantity and amount column letters; defaults to [input] columns
    #[arg(short, long)]
    pub columns: Option<String>,

    /// Rows dropped after the empty-quantity filter; defaults to [transform] skip_head
    #[arg(long)]
    pub skip_head: Option<usize>,

    /// Trailing rows dropped; defaults to [transform] skip_tail
    #[arg(long)]
    pub skip_tail: Option<usize>,

    /// Directory for the processed file; defaults to [output] dir
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Only preview, do not write a processed file
    #[arg(long)]
    pub no_export: bool,

    /// Preview rows, 0 for all
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
