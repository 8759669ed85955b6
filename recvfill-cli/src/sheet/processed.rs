//! Export and re-import of processed row tables
//!
//! A processed file has a single sheet: one header row followed by
//! item / quantity / amount records, in that column order.

use std::path::{Path, PathBuf};

use calamine::{Reader, open_workbook_auto};
use chrono::{DateTime, Local};
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use super::reader::absolute_grid;
use super::{Cell, SheetError};
use crate::records::Row;

const SHEET_NAME: &str = "Processed";

/// Header labels written above the three columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub item: String,
    pub quantity: String,
    pub amount: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            item: "item".to_string(),
            quantity: "quantity".to_string(),
            amount: "amount".to_string(),
        }
    }
}

/// `processed_data_<YYYYMMDD_HHMMSS>.xlsx` for the given moment
pub fn processed_file_name(at: DateTime<Local>) -> String {
    format!("processed_data_{}.xlsx", at.format("%Y%m%d_%H%M%S"))
}

/// Write rows to `path`
pub fn write_rows_excel(rows: &[Row], path: &Path, labels: &ColumnLabels) -> Result<(), SheetError> {
    let write_err = |e: rust_xlsxwriter::XlsxError| SheetError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(write_err)?;

    let header_format = Format::new().set_bold();
    for (col, label) in [&labels.item, &labels.quantity, &labels.amount].into_iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, label, &header_format)
            .map_err(write_err)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        worksheet.write_string(r, 0, &row.item).map_err(write_err)?;
        worksheet.write_number(r, 1, row.quantity).map_err(write_err)?;
        worksheet.write_number(r, 2, row.amount).map_err(write_err)?;
    }

    worksheet.autofit();
    workbook.save(path).map_err(write_err)?;

    Ok(())
}

/// Write rows into `dir` under a timestamped name, returning the file path
pub fn write_processed_excel(rows: &[Row], dir: &Path, labels: &ColumnLabels) -> Result<PathBuf, SheetError> {
    let path = dir.join(processed_file_name(Local::now()));
    write_rows_excel(rows, &path, labels)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Read rows back from a processed file (first sheet, header row skipped)
pub fn read_processed_excel(path: &Path) -> Result<Vec<Row>, SheetError> {
    if !path.exists() {
        return Err(SheetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetError::InvalidSheet {
            requested: "#0".to_string(),
            available: Vec::new(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SheetError::Read {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

    let mut rows = Vec::new();
    // sheet row 0 is the header, wherever the used range begins
    for (row_idx, data) in absolute_grid(&range).into_iter().enumerate().skip(1) {
        let cells: Vec<Cell> = (0..3)
            .map(|c| data.get(c).cloned().unwrap_or(Cell::Empty))
            .collect();

        if cells.iter().all(Cell::is_empty) {
            continue;
        }

        // 1-based sheet row for messages
        let sheet_row = row_idx + 1;

        let item = cells[0].as_text().ok_or_else(|| SheetError::InvalidValue {
            row: sheet_row,
            column: "item".to_string(),
            value: String::new(),
        })?;

        let number = |cell: &Cell, column: &str| {
            cell.as_number().ok_or_else(|| SheetError::InvalidValue {
                row: sheet_row,
                column: column.to_string(),
                value: cell.to_string(),
            })
        };

        rows.push(Row::new(
            item,
            number(&cells[1], "quantity")?,
            number(&cells[2], "amount")?,
        ));
    }

    Ok(rows)
}
