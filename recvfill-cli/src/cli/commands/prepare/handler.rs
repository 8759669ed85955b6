//! Prepare command handler

use anyhow::{Context, Result};
use colored::*;

use super::PrepareArgs;
use crate::cli::commands::{load_raw_rows, workbook_path};
use crate::cli::output::{Grid, OutputFormat};
use crate::config::Config;
use crate::sheet::write_processed_excel;

pub fn handle_prepare_command(args: PrepareArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    apply_overrides(&args, &mut config);

    let path = workbook_path(args.file.clone(), &config)?;
    let rows = load_raw_rows(
        &path,
        &config.input.sheet,
        &config.input.read_options()?,
        &config.transform,
    )?;

    let limit = (args.limit > 0).then_some(args.limit);
    let preview = Grid::from_rows(&rows, &config.output.labels, limit);

    if args.format == OutputFormat::Table {
        println!(
            "{} {} rows from {}",
            "Loaded".bright_green(),
            rows.len(),
            path.display().to_string().cyan()
        );
        println!();
    }
    print!("{}", preview.render(args.format)?);
    if args.format == OutputFormat::Table && limit.is_some_and(|n| rows.len() > n) {
        println!("{}", format!("({} of {} rows shown)", args.limit, rows.len()).dimmed());
    }

    if args.no_export {
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("{}", "No rows left after cleanup, nothing exported".yellow());
        return Ok(());
    }

    std::fs::create_dir_all(&config.output.dir).with_context(|| {
        format!("Failed to create output directory: {}", config.output.dir.display())
    })?;
    let written = write_processed_excel(&rows, &config.output.dir, &config.output.labels)
        .context("Failed to export processed file")?;
    eprintln!(
        "{} {}",
        "Processed file written:".bright_green(),
        written.display()
    );

    Ok(())
}

fn apply_overrides(args: &PrepareArgs, config: &mut Config) {
    if let Some(sheet) = &args.sheet {
        config.input.sheet = sheet.clone();
    }
    if let Some(columns) = &args.columns {
        config.input.columns = columns.clone();
    }
    if let Some(skip_head) = args.skip_head {
        config.transform.skip_head = skip_head;
    }
    if let Some(skip_tail) = args.skip_tail {
        config.transform.skip_tail = skip_tail;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
}
