mod cli;
mod config;
mod form;
mod records;
mod sheet;

use anyhow::Result;
use clap::Parser;
use colored::*;
use log::debug;

use cli::commands::config::{ConfigCommands, handle_config_command};
use cli::commands::fill::handle_fill_command;
use cli::commands::prepare::handle_prepare_command;
use cli::commands::sheets::handle_sheets_command;
use cli::{Cli, Commands};
use config::{Config, ConfigSource};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise -v raises the default level
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn,recvfill=info",
        1 => "info,recvfill=debug",
        _ => "debug,recvfill=trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // init must work even when the existing file no longer parses
    let (config, source) = match &cli.command {
        Commands::Config(ConfigCommands::Init { .. }) => (Config::default(), ConfigSource::Defaults),
        _ => Config::load(cli.config.as_deref())?,
    };
    debug!("Using configuration from {}", source);

    match cli.command {
        Commands::Sheets(cmd) => handle_sheets_command(cmd, &config),
        Commands::Prepare(args) => handle_prepare_command(args, &config),
        Commands::Fill(args) => handle_fill_command(args, &config).await,
        Commands::Config(cmd) => handle_config_command(cmd, &config, &source, cli.config.as_deref()),
    }
}
