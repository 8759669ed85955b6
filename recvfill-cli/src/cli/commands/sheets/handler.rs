//! Sheets command handlers

use anyhow::{Context, Result};
use colored::*;

use super::{InfoArgs, ListArgs, SheetsCommands, ShowArgs};
use crate::cli::commands::{open_workbook, workbook_path};
use crate::cli::output::{Grid, OutputFormat};
use crate::config::Config;
use crate::sheet::{Cell, ColumnSelection, PreprocessOptions, ReadOptions, SheetInfo};

pub fn handle_sheets_command(cmd: SheetsCommands, config: &Config) -> Result<()> {
    match cmd {
        SheetsCommands::List(args) => list_sheets(args, config),
        SheetsCommands::Info(args) => sheet_info(args, config),
        SheetsCommands::Show(args) => show_sheet(args, config),
    }
}

fn list_sheets(args: ListArgs, config: &Config) -> Result<()> {
    let path = workbook_path(args.file, config)?;
    let reader = open_workbook(&path)?;

    println!("Sheets in {}:", path.display().to_string().cyan());
    for (i, name) in reader.sheet_names().iter().enumerate() {
        println!("  {}  {}", i.to_string().bright_blue(), name);
    }

    Ok(())
}

fn sheet_info(args: InfoArgs, config: &Config) -> Result<()> {
    let path = workbook_path(args.file, config)?;
    let sheet = args.sheet.unwrap_or_else(|| config.input.sheet.clone());

    let mut reader = open_workbook(&path)?;
    let info = reader
        .sheet_info(&sheet)
        .with_context(|| format!("Failed to inspect sheet {}", sheet))?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&info).context("Failed to format JSON output")?;
            println!("{}", json);
        }
        OutputFormat::Csv => print!("{}", column_grid(&info).render(OutputFormat::Csv)?),
        OutputFormat::Table => {
            println!("Sheet:   {}", info.name.bright_green().bold());
            println!("Rows:    {}", info.row_count);
            println!("Columns: {}", info.column_count);
            println!();
            print!("{}", column_grid(&info).render(OutputFormat::Table)?);
        }
    }

    Ok(())
}

fn column_grid(info: &SheetInfo) -> Grid {
    Grid {
        headers: ["letter", "name", "type", "empty"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: info
            .columns
            .iter()
            .map(|c| {
                vec![
                    Cell::String(c.letter.clone()),
                    Cell::String(c.name.clone()),
                    Cell::String(c.inferred_type.to_string()),
                    Cell::Int(c.empty_count as i64),
                ]
            })
            .collect(),
    }
}

fn show_sheet(args: ShowArgs, config: &Config) -> Result<()> {
    let path = workbook_path(args.file.clone(), config)?;
    let sheet = args.sheet.clone().unwrap_or_else(|| config.input.sheet.clone());

    let mut reader = open_workbook(&path)?;
    let read = read_options(&args);
    let table = match preprocess_options(&args) {
        Some(preprocess) => reader.read_sheet_preprocessed(&sheet, &read, &preprocess),
        None => reader.read_sheet(&sheet, &read),
    }
    .with_context(|| format!("Failed to read sheet {}", sheet))?;

    if args.format == OutputFormat::Table && table.is_empty() {
        println!("{}", format!("Sheet {} has no data rows", sheet).yellow());
        return Ok(());
    }

    let limit = (args.limit > 0).then_some(args.limit);
    print!("{}", Grid::from_table(&table, limit).render(args.format)?);

    if args.format == OutputFormat::Table && table.len() > args.limit && args.limit > 0 {
        println!(
            "{}",
            format!("({} of {} rows shown)", args.limit, table.len()).dimmed()
        );
    }

    Ok(())
}

fn preprocess_options(args: &ShowArgs) -> Option<PreprocessOptions> {
    args.clean.then(|| PreprocessOptions {
        fill_value: args.fill_value.as_deref().map(Cell::parse),
        ..PreprocessOptions::default()
    })
}

fn read_options(args: &ShowArgs) -> ReadOptions {
    let columns = match (&args.columns, &args.names) {
        (Some(letters), _) => Some(ColumnSelection::Letters(letters.clone())),
        (None, Some(names)) => Some(ColumnSelection::Names(
            names.iter().map(|n| n.trim().to_string()).collect(),
        )),
        (None, None) => None,
    };

    ReadOptions {
        header: (!args.no_header).then_some(args.header),
        skip_rows: args.skip_rows,
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn show_args(argv: &[&str]) -> ShowArgs {
        let mut full = vec!["recvfill", "sheets", "show"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Sheets(SheetsCommands::Show(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_read_options_from_flags() {
        let options = read_options(&show_args(&["book.xlsx", "--columns", "C,T,U", "--skip-rows", "2"]));
        assert_eq!(options.header, Some(0));
        assert_eq!(options.skip_rows, 2);
        assert_eq!(options.columns, Some(ColumnSelection::Letters("C,T,U".to_string())));

        let options = read_options(&show_args(&["--names", "item, qty", "--no-header"]));
        assert_eq!(options.header, None);
        assert_eq!(
            options.columns,
            Some(ColumnSelection::Names(vec!["item".to_string(), "qty".to_string()]))
        );
    }

    #[test]
    fn test_preprocess_options_only_with_clean() {
        assert_eq!(preprocess_options(&show_args(&["book.xlsx"])), None);

        let options = preprocess_options(&show_args(&["--clean", "--fill-value", "0"])).unwrap();
        assert_eq!(options.fill_value, Some(Cell::Int(0)));
        assert!(options.drop_empty_rows && options.drop_empty_cols);
    }

    #[test]
    fn test_fill_value_requires_clean() {
        assert!(Cli::try_parse_from(["recvfill", "sheets", "show", "--fill-value", "0"]).is_err());
    }
}
