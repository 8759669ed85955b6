//! Read worksheets from `.xls`/`.xlsx` workbooks

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use log::debug;
use serde::{Deserialize, Serialize};

use super::table::header_names;
use super::{Cell, ColumnSelection, SheetError, SheetInfo, Table, parse_column_letters};

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// A sheet addressed by zero-based index or by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetRef {
    Index(usize),
    Name(String),
}

impl std::str::FromStr for SheetRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(index) => SheetRef::Index(index),
            Err(_) => SheetRef::Name(s.to_string()),
        })
    }
}

impl std::fmt::Display for SheetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetRef::Index(i) => write!(f, "#{}", i),
            SheetRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

impl Default for SheetRef {
    fn default() -> Self {
        SheetRef::Index(0)
    }
}

/// Options for [`SpreadsheetReader::read_sheet`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Row used as column names, counted after `skip_rows`. `None` names columns `0..n`.
    pub header: Option<usize>,
    /// Leading sheet rows to ignore entirely
    pub skip_rows: usize,
    /// Restrict the result to these columns
    pub columns: Option<ColumnSelection>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header: Some(0),
            skip_rows: 0,
            columns: None,
        }
    }
}

/// Options for [`SpreadsheetReader::read_sheet_preprocessed`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    pub drop_empty_rows: bool,
    pub drop_empty_cols: bool,
    /// Replacement for cells still empty after dropping
    pub fill_value: Option<Cell>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            drop_empty_rows: true,
            drop_empty_cols: true,
            fill_value: None,
        }
    }
}

impl PreprocessOptions {
    /// Drop empty rows, then empty columns, then fill what is still empty
    fn apply(&self, table: &mut Table) {
        if self.drop_empty_rows {
            table.drop_empty_rows();
        }

        if self.drop_empty_cols {
            table.drop_empty_columns();
        }

        if let Some(value) = &self.fill_value {
            table.fill_empty(value);
        }
    }
}

/// An open workbook
pub struct SpreadsheetReader {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl std::fmt::Debug for SpreadsheetReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpreadsheetReader")
            .field("path", &self.path)
            .field("sheet_names", &self.sheet_names)
            .finish()
    }
}

impl SpreadsheetReader {
    /// Open a workbook, checking that it exists and has a supported extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(SheetError::NotFound { path });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        if !SUPPORTED_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            return Err(SheetError::UnsupportedFormat { path, extension });
        }

        let workbook = open_workbook_auto(&path).map_err(|e| SheetError::Open {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let sheet_names = workbook.sheet_names().to_vec();

        debug!(
            "Opened {} with {} sheets: {:?}",
            path.display(),
            sheet_names.len(),
            sheet_names
        );

        Ok(Self {
            path,
            workbook,
            sheet_names,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Resolve a sheet reference to its name
    pub fn resolve_sheet(&self, sheet: &SheetRef) -> Result<String, SheetError> {
        let found = match sheet {
            SheetRef::Index(i) => self.sheet_names.get(*i).cloned(),
            SheetRef::Name(name) => self.sheet_names.iter().find(|n| *n == name).cloned(),
        };

        found.ok_or_else(|| SheetError::InvalidSheet {
            requested: sheet.to_string(),
            available: self.sheet_names.clone(),
        })
    }

    /// Read a sheet into a table
    pub fn read_sheet(&mut self, sheet: &SheetRef, options: &ReadOptions) -> Result<Table, SheetError> {
        let name = self.resolve_sheet(sheet)?;

        let range = self
            .workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::Read {
                sheet: name.clone(),
                message: e.to_string(),
            })?;

        let mut grid = absolute_grid(&range);
        debug!("Sheet '{}' spans {} rows from A1", name, grid.len());

        grid.drain(..options.skip_rows.min(grid.len()));

        // Letter selections may point past the used range; pad so every index exists
        let letter_indexes = match &options.columns {
            Some(ColumnSelection::Letters(spec)) => Some(parse_column_letters(spec)?),
            _ => None,
        };
        let used_width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let width = letter_indexes
            .as_ref()
            .and_then(|idx| idx.last().map(|last| last + 1))
            .map_or(used_width, |w| w.max(used_width));
        for row in &mut grid {
            row.resize(width, Cell::Empty);
        }

        let (columns, rows) = match options.header {
            Some(header) if header < grid.len() => {
                let rows = grid.split_off(header + 1);
                let header_row = grid.pop().unwrap_or_default();
                (header_names(&header_row), rows)
            }
            Some(_) => (header_names(&vec![Cell::Empty; width]), Vec::new()),
            None => ((0..width).map(|i| i.to_string()).collect(), grid),
        };

        let indexes = match (&options.columns, letter_indexes) {
            (_, Some(indexes)) => indexes,
            (Some(ColumnSelection::Names(names)), _) => names
                .iter()
                .map(|name| {
                    columns
                        .iter()
                        .position(|c| c == name)
                        .ok_or_else(|| SheetError::UnknownColumn {
                            name: name.clone(),
                            available: columns.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|mut idx| {
                    idx.sort_unstable();
                    idx.dedup();
                    idx
                })?,
            (_, None) => return Ok(Table::new(columns, rows)),
        };

        let selected_columns = indexes.iter().map(|&i| columns[i].clone()).collect();
        let selected_rows = rows
            .into_iter()
            .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table::new(selected_columns, selected_rows))
    }

    /// Read a sheet, then clean it up
    pub fn read_sheet_preprocessed(
        &mut self,
        sheet: &SheetRef,
        read: &ReadOptions,
        options: &PreprocessOptions,
    ) -> Result<Table, SheetError> {
        let mut table = self.read_sheet(sheet, read)?;
        options.apply(&mut table);
        Ok(table)
    }

    /// Row/column counts, names, inferred types and empty-cell counts of a sheet
    pub fn sheet_info(&mut self, sheet: &SheetRef) -> Result<SheetInfo, SheetError> {
        let name = self.resolve_sheet(sheet)?;
        let table = self.read_sheet(sheet, &ReadOptions::default())?;
        Ok(table.info(&name))
    }
}

/// Expand a calamine range into a grid anchored at A1, so column positions
/// match the letters shown in Excel even when the used range starts later.
pub(super) fn absolute_grid(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };

    (0..=end_row)
        .map(|r| {
            (0..=end_col)
                .map(|c| range.get_value((r, c)).map(Cell::from_data).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use crate::sheet::table::ColumnType;

    /// Build a workbook with a second sheet that looks like a billing sheet:
    /// item numbers in C, quantities in T, amounts in U.
    fn billing_workbook(dir: &Path) -> PathBuf {
        let path = dir.join("billing.xlsx");
        let mut workbook = Workbook::new();

        let summary = workbook.add_worksheet();
        summary.set_name("Summary").unwrap();
        summary.write_string(0, 0, "total").unwrap();

        let detail = workbook.add_worksheet();
        detail.set_name("Detail").unwrap();
        for col in 0..22u16 {
            detail.write_string(0, col, &format!("h{}", col)).unwrap();
        }
        let data = [("1-2", 3.0, 30.0), ("1-1", 1.0, 10.0), ("2-1", 5.0, 55.5)];
        for (i, (item, qty, amt)) in data.iter().enumerate() {
            let row = (i + 1) as u32;
            detail.write_string(row, 0, "filler").unwrap();
            detail.write_string(row, 2, *item).unwrap();
            detail.write_number(row, 19, *qty).unwrap();
            detail.write_number(row, 20, *amt).unwrap();
        }

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_missing_file() {
        let err = SpreadsheetReader::open("/definitely/not/here.xlsx").unwrap_err();
        assert!(matches!(err, SheetError::NotFound { .. }));
    }

    #[test]
    fn test_open_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let err = SpreadsheetReader::open(&path).unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat { ref extension, .. } if extension == "csv"));
    }

    #[test]
    fn test_sheet_names_and_invalid_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = SpreadsheetReader::open(billing_workbook(dir.path())).unwrap();

        assert_eq!(reader.sheet_names(), &["Summary".to_string(), "Detail".to_string()]);

        let err = reader
            .read_sheet(&SheetRef::Index(5), &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, SheetError::InvalidSheet { .. }));

        let err = reader
            .read_sheet(&SheetRef::Name("Nope".into()), &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, SheetError::InvalidSheet { .. }));
    }

    #[test]
    fn test_read_sheet_letter_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = SpreadsheetReader::open(billing_workbook(dir.path())).unwrap();

        let options = ReadOptions {
            columns: Some(ColumnSelection::Letters("C,T,U".into())),
            ..Default::default()
        };
        let table = reader.read_sheet(&SheetRef::Name("Detail".into()), &options).unwrap();

        assert_eq!(table.columns, vec!["h2", "h19", "h20"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0][0], Cell::String("1-2".into()));
        assert_eq!(table.rows[2][1].as_number(), Some(5.0));
        assert_eq!(table.rows[2][2].as_number(), Some(55.5));
    }

    #[test]
    fn test_read_sheet_named_columns_and_skip_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = SpreadsheetReader::open(billing_workbook(dir.path())).unwrap();

        let options = ReadOptions {
            header: None,
            skip_rows: 1,
            columns: None,
        };
        let table = reader.read_sheet(&SheetRef::Index(1), &options).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns[0], "0");

        let options = ReadOptions {
            columns: Some(ColumnSelection::Names(vec!["h20".into(), "h2".into()])),
            ..Default::default()
        };
        let table = reader.read_sheet(&SheetRef::Index(1), &options).unwrap();
        assert_eq!(table.columns, vec!["h2", "h20"]);

        let options = ReadOptions {
            columns: Some(ColumnSelection::Names(vec!["missing".into()])),
            ..Default::default()
        };
        let err = reader.read_sheet(&SheetRef::Index(1), &options).unwrap_err();
        assert!(matches!(err, SheetError::UnknownColumn { .. }));
    }

    #[test]
    fn test_letters_past_used_range_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = SpreadsheetReader::open(billing_workbook(dir.path())).unwrap();

        let options = ReadOptions {
            columns: Some(ColumnSelection::Letters("C,AA".into())),
            ..Default::default()
        };
        let table = reader.read_sheet(&SheetRef::Index(1), &options).unwrap();
        assert_eq!(table.columns, vec!["h2", "Unnamed: 26"]);
        assert!(table.column(1).all(Cell::is_empty));
    }

    #[test]
    fn test_read_sheet_preprocessed() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = SpreadsheetReader::open(billing_workbook(dir.path())).unwrap();

        let options = PreprocessOptions {
            fill_value: Some(Cell::Int(0)),
            ..Default::default()
        };
        let table = reader
            .read_sheet_preprocessed(&SheetRef::Index(1), &ReadOptions::default(), &options)
            .unwrap();

        // Header-only columns are empty in every data row and get dropped
        assert_eq!(table.columns, vec!["h0", "h2", "h19", "h20"]);
        assert_eq!(table.len(), 3);
        assert!(table.rows.iter().flatten().all(|c| !c.is_empty()));

        let read = ReadOptions {
            columns: Some(ColumnSelection::Letters("B:C".to_string())),
            ..Default::default()
        };
        let table = reader
            .read_sheet_preprocessed(&SheetRef::Index(1), &read, &PreprocessOptions::default())
            .unwrap();
        assert_eq!(table.columns, vec!["h2"]);
        assert_eq!(table.column(0).map(|c| c.to_string()).collect::<Vec<_>>(), vec!["1-2", "1-1", "2-1"]);
    }

    #[test]
    fn test_sheet_info() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = SpreadsheetReader::open(billing_workbook(dir.path())).unwrap();

        let info = reader.sheet_info(&SheetRef::Index(1)).unwrap();
        assert_eq!(info.name, "Detail");
        assert_eq!(info.row_count, 3);
        assert_eq!(info.column_count, 22);
        assert_eq!(info.columns[2].inferred_type, ColumnType::Text);
        assert_eq!(info.columns[19].inferred_type, ColumnType::Float);
        assert_eq!(info.columns[1].empty_count, 3);
    }

    #[test]
    fn test_sheet_ref_from_str() {
        assert_eq!("2".parse::<SheetRef>().unwrap(), SheetRef::Index(2));
        assert_eq!("Detail".parse::<SheetRef>().unwrap(), SheetRef::Name("Detail".into()));
    }
}
