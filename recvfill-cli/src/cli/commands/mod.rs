//! Subcommand arguments and handlers

pub mod config;
pub mod fill;
pub mod prepare;
pub mod sheets;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::config::Config;
use crate::records::{Row, TransformOptions, transform_rows};
use crate::sheet::{ReadOptions, SheetRef, SpreadsheetReader};

/// Workbook from the command line, else `[input] path`
pub(crate) fn workbook_path(file: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    file.or_else(|| config.input.path.clone()).ok_or_else(|| {
        anyhow::anyhow!("No workbook given. Pass a file path or set [input] path in the config file.")
    })
}

pub(crate) fn open_workbook(path: &Path) -> Result<SpreadsheetReader> {
    SpreadsheetReader::open(path).context("Failed to open workbook")
}

/// Read the billing sheet and turn it into sorted receiving rows
pub(crate) fn load_raw_rows(
    path: &Path,
    sheet: &SheetRef,
    read: &ReadOptions,
    transform: &TransformOptions,
) -> Result<Vec<Row>> {
    let mut reader = open_workbook(path)?;
    let table = reader
        .read_sheet(sheet, read)
        .with_context(|| format!("Failed to read sheet {} of {}", sheet, path.display()))?;
    info!("Read {} rows x {} columns from sheet {}", table.len(), table.width(), sheet);

    let rows = transform_rows(&table, transform).context("Failed to transform sheet rows")?;
    info!("{} receiving rows after cleanup", rows.len());

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Billing layout on the third sheet: item numbers in C, quantities in T,
    /// amounts in U, two header remnant rows and a trailing total
    fn billing_workbook(dir: &Path) -> PathBuf {
        let path = dir.join("billing.xlsx");
        let mut workbook = Workbook::new();

        workbook.add_worksheet().set_name("Cover").unwrap();
        workbook.add_worksheet().set_name("Summary").unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Detail").unwrap();
        sheet.write_string(0, 2, "項次").unwrap();
        sheet.write_string(0, 19, "數量").unwrap();
        sheet.write_string(0, 20, "複價").unwrap();
        sheet.write_string(1, 2, "unit").unwrap();
        sheet.write_string(1, 19, "pcs").unwrap();
        sheet.write_string(2, 19, "(qty)").unwrap();
        sheet.write_string(3, 2, "2-1").unwrap();
        sheet.write_number(3, 19, 5.0).unwrap();
        sheet.write_number(3, 20, 50.0).unwrap();
        sheet.write_string(4, 2, "1-10").unwrap();
        sheet.write_number(4, 19, 1.0).unwrap();
        sheet.write_number(4, 20, 10.0).unwrap();
        sheet.write_string(5, 2, "section B").unwrap();
        sheet.write_string(6, 2, "1-2").unwrap();
        sheet.write_number(6, 19, 3.0).unwrap();
        sheet.write_string(7, 2, "Total").unwrap();
        sheet.write_number(7, 19, 9.0).unwrap();
        sheet.write_number(7, 20, 60.0).unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_raw_rows_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = billing_workbook(dir.path());
        let config = Config::default();

        let rows = load_raw_rows(
            &path,
            &config.input.sheet,
            &config.input.read_options().unwrap(),
            &config.transform,
        )
        .unwrap();

        assert_eq!(
            rows,
            vec![
                Row::new("1-2", 3.0, 0.0),
                Row::new("1-10", 1.0, 10.0),
                Row::new("2-1", 5.0, 50.0),
            ]
        );
    }

    #[test]
    fn test_workbook_path_falls_back_to_config() {
        let mut config = Config::default();
        assert!(workbook_path(None, &config).is_err());

        config.input.path = Some(PathBuf::from("billing.xls"));
        assert_eq!(workbook_path(None, &config).unwrap(), PathBuf::from("billing.xls"));
        assert_eq!(
            workbook_path(Some(PathBuf::from("other.xlsx")), &config).unwrap(),
            PathBuf::from("other.xlsx")
        );
    }
}
