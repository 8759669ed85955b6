//! Command line interface

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::fill::FillArgs;
use commands::prepare::PrepareArgs;
use commands::sheets::SheetsCommands;

#[derive(Parser, Debug)]
#[command(
    name = "recvfill",
    version,
    about = "Fill receiving quantities and amounts from a billing spreadsheet into the receiving web form"
)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (overrides the default lookup)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect workbooks: list sheets, column info, cell contents
    #[command(subcommand)]
    Sheets(SheetsCommands),

    /// Read and clean the billing sheet, preview it and export the processed file
    Prepare(PrepareArgs),

    /// Type the rows into the receiving form in a browser
    Fill(FillArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}
