//! Configuration file management

pub mod handler;

use std::path::PathBuf;

use clap::Subcommand;

pub use handler::handle_config_command;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with the default values
    Init {
        /// Target file; defaults to $RECVFILL_CONFIG or the user config directory
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
    /// Print which configuration file is used
    Path,
}
