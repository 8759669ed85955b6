//! Fill the receiving form in a browser

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::sheet::SheetRef;

pub use handler::handle_fill_command;

#[derive(Args, Debug)]
pub struct FillArgs {
    /// Raw billing workbook to read and clean
    #[arg(short, long, conflicts_with = "processed")]
    pub input: Option<PathBuf>,

    /// Previously exported processed file (processed_data_*.xlsx)
    #[arg(short, long)]
    pub processed: Option<PathBuf>,

    /// Sheet of the raw workbook; defaults to [input] sheet
    #[arg(short, long)]
    pub sheet: Option<SheetRef>,

    /// Receiving form URL; defaults to [form] url
    #[arg(short, long)]
    pub url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// WebDriver endpoint; defaults to [form.webdriver] url
    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,

    /// Start this chromedriver binary instead of using a running one
    #[arg(long, value_name = "PATH")]
    pub chromedriver: Option<PathBuf>,

    /// Pause between rows in milliseconds; defaults to [timing] row_delay_ms
    #[arg(long)]
    pub row_delay_ms: Option<u64>,

    /// Do not wait for a manual login after the page opens
    #[arg(long)]
    pub no_login_pause: bool,

    /// Close the browser right after processing
    #[arg(long)]
    pub no_close_pause: bool,

    /// Write the run outcome as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}
