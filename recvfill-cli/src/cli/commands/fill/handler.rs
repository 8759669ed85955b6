//! Fill command handler

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::*;
use dialoguer::{Input, Select};
use is_terminal::IsTerminal;
use log::{info, warn};
use serde::Serialize;

use super::FillArgs;
use crate::cli::commands::load_raw_rows;
use crate::cli::output::{Grid, OutputFormat};
use crate::config::Config;
use crate::form::{FailureKind, FormFiller, PageWait, ProcessResult, WebDriverLauncher};
use crate::records::Row;
use crate::sheet::read_processed_excel;

const PREVIEW_ROWS: usize = 5;

/// Where the rows to type come from
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowSource {
    /// Raw billing workbook, cleaned on the fly
    Raw(PathBuf),
    /// Exported processed file
    Processed(PathBuf),
}

impl std::fmt::Display for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowSource::Raw(path) => write!(f, "raw workbook {}", path.display()),
            RowSource::Processed(path) => write!(f, "processed file {}", path.display()),
        }
    }
}

/// Outcome of one fill run, written with --report
#[derive(Debug, Serialize)]
struct FillReport {
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    elapsed_secs: f64,
    url: String,
    source: String,
    #[serde(flatten)]
    result: ProcessResult,
}

pub async fn handle_fill_command(args: FillArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    apply_overrides(&args, &mut config);

    let interactive = std::io::stdin().is_terminal();
    let source = choose_source(candidate_sources(&args, &config), interactive).await?;
    let rows = load_rows(&source, &config)?;
    if rows.is_empty() {
        anyhow::bail!("No rows to fill from {}", source);
    }

    println!(
        "{} {} rows from {}",
        "Loaded".bright_green(),
        rows.len(),
        source.to_string().cyan()
    );
    print!(
        "{}",
        Grid::from_rows(&rows, &config.output.labels, Some(PREVIEW_ROWS)).render(OutputFormat::Table)?
    );
    println!();

    if config.form.url.trim().is_empty() {
        anyhow::bail!("No form URL. Pass --url or set [form] url in the config file.");
    }

    let launcher = WebDriverLauncher::new(config.form.webdriver.clone())
        .context("Failed to set up the WebDriver client")?;
    let mut filler = FormFiller::with_id_scan(Box::new(launcher), config.form.selectors.clone())
        .with_field_settle(config.timing.field_settle());

    let outcome = tokio::select! {
        result = run(&mut filler, &rows, &config, &args, &source, interactive) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let state = filler.state();
    if let Err(err) = filler.close_browser().await {
        warn!("Failed to close the browser: {}", err);
    }

    match outcome {
        Some(result) => result.map(|_| ()),
        None => anyhow::bail!("Interrupted while {}, browser closed", state),
    }
}

async fn run(
    filler: &mut FormFiller,
    rows: &[Row],
    config: &Config,
    args: &FillArgs,
    source: &RowSource,
    interactive: bool,
) -> Result<ProcessResult> {
    filler
        .start_browser(config.form.headless)
        .await
        .context("Failed to start the browser")?;
    filler
        .open_url(&config.form.url, &PageWait::fixed(config.timing.page_settle()))
        .await
        .context("Failed to open the form")?;

    if interactive && !args.no_login_pause {
        pause("Log in in the browser if needed, then press Enter to start").await?;
    }

    let ready = config.form.ready_element();
    info!("Waiting for element {}", ready);
    filler
        .wait_until_ready(&config.timing.ready_wait(ready.clone()))
        .await
        .with_context(|| format!("The form never showed element {}", ready))?;

    let started_at = Local::now();
    println!("Start: {}", started_at.format("%Y-%m-%d %H:%M:%S"));
    let clock = Instant::now();

    let result = filler
        .process(rows, config.timing.row_delay())
        .await
        .context("Processing stopped")?;

    let elapsed = clock.elapsed();
    let finished_at = Local::now();
    println!("End:   {}", finished_at.format("%Y-%m-%d %H:%M:%S"));
    print_summary(&result, elapsed);

    if let Some(path) = &args.report {
        let report = FillReport {
            started_at,
            finished_at,
            elapsed_secs: elapsed.as_secs_f64(),
            url: config.form.url.clone(),
            source: source.to_string(),
            result: result.clone(),
        };
        write_report(path, &report)?;
        println!("Report written to {}", path.display().to_string().cyan());
    }

    if interactive && !args.no_close_pause {
        pause("Check the form, then press Enter to close the browser").await?;
    }

    Ok(result)
}

fn apply_overrides(args: &FillArgs, config: &mut Config) {
    if let Some(sheet) = &args.sheet {
        config.input.sheet = sheet.clone();
    }
    if let Some(url) = &args.url {
        config.form.url = url.clone();
    }
    if args.headless {
        config.form.headless = true;
    }
    if let Some(webdriver_url) = &args.webdriver_url {
        config.form.webdriver.url = webdriver_url.clone();
    }
    if let Some(chromedriver) = &args.chromedriver {
        config.form.webdriver.chromedriver_path = Some(chromedriver.clone());
    }
    if let Some(delay) = args.row_delay_ms {
        config.timing.row_delay_ms = delay;
    }
}

/// Sources in preference order; a flag on the command line wins over the config
fn candidate_sources(args: &FillArgs, config: &Config) -> Vec<RowSource> {
    if let Some(path) = &args.processed {
        return vec![RowSource::Processed(path.clone())];
    }
    if let Some(path) = &args.input {
        return vec![RowSource::Raw(path.clone())];
    }

    let raw = config.input.path.clone().map(RowSource::Raw);
    let processed = config.input.processed.clone().map(RowSource::Processed);
    raw.into_iter().chain(processed).collect()
}

async fn choose_source(mut candidates: Vec<RowSource>, interactive: bool) -> Result<RowSource> {
    if candidates.is_empty() {
        anyhow::bail!(
            "No input. Pass --input or --processed, or set [input] path / processed in the config file."
        );
    }

    if candidates.len() == 1 || !interactive {
        return Ok(candidates.swap_remove(0));
    }

    let items: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    let choice = tokio::task::spawn_blocking(move || {
        Select::new()
            .with_prompt("Data source")
            .items(&items)
            .default(0)
            .interact()
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read the selection")?;

    Ok(candidates.swap_remove(choice))
}

fn load_rows(source: &RowSource, config: &Config) -> Result<Vec<Row>> {
    match source {
        RowSource::Raw(path) => load_raw_rows(
            path,
            &config.input.sheet,
            &config.input.read_options()?,
            &config.transform,
        ),
        RowSource::Processed(path) => read_processed_excel(path)
            .with_context(|| format!("Failed to read processed file {}", path.display())),
    }
}

/// Block on Enter without stalling the runtime
async fn pause(prompt: &str) -> Result<()> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read from the terminal")?;

    Ok(())
}

fn print_summary(result: &ProcessResult, elapsed: Duration) {
    println!();
    println!("{}", "Summary".bold());
    println!("  Total:     {}", result.total);
    println!("  Filled:    {}", result.success.to_string().bright_green());
    println!("  Failed:    {}", result.failed.to_string().red());
    println!("  Not found: {}", result.not_found.to_string().yellow());
    println!("  Elapsed:   {:.2}s", elapsed.as_secs_f64());

    if result.is_complete_success() {
        println!();
        println!("{}", "Every row was filled".bright_green());
    }

    if !result.failed_items.is_empty() {
        println!();
        println!("{}", "Rows not filled:".bold());
        for failed in &result.failed_items {
            let kind = match failed.kind {
                FailureKind::NotFound => "not found".yellow(),
                FailureKind::LookupFailed => "lookup failed".red(),
                FailureKind::WriteFailed => "write failed".red(),
            };
            println!("  {}  {}  {}", failed.item, kind, failed.reason.dimmed());
        }
    }
}

fn write_report(path: &Path, report: &FillReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}
