//! Rendering of tabular command output

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use crate::records::Row;
use crate::sheet::{Cell, ColumnLabels, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for the terminal
    #[default]
    Table,
    /// Pretty-printed JSON array of objects
    Json,
    Csv,
}

/// Header plus typed cells, ready to print in any [`OutputFormat`]
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn from_table(table: &Table, limit: Option<usize>) -> Self {
        let take = limit.unwrap_or(usize::MAX);
        Self {
            headers: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .take(take)
                .cloned()
                .collect(),
        }
    }

    pub fn from_rows(rows: &[Row], labels: &ColumnLabels, limit: Option<usize>) -> Self {
        let take = limit.unwrap_or(usize::MAX);
        Self {
            headers: vec![
                labels.item.clone(),
                labels.quantity.clone(),
                labels.amount.clone(),
            ],
            rows: rows
                .iter()
                .take(take)
                .map(|row| {
                    vec![
                        Cell::String(row.item.clone()),
                        Cell::Float(row.quantity),
                        Cell::Float(row.amount),
                    ]
                })
                .collect(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.to_text_table()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&self.to_json()?).context("Failed to format JSON output")
            }
            OutputFormat::Csv => self.to_csv(),
        }
    }

    fn to_text_table(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect();

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.width());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w).bold().to_string())
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  ").dimmed().to_string());
        out.push('\n');

        for row in &rows {
            let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }

        out
    }

    /// One object per row; empty cells become `null`
    fn to_json(&self) -> Result<Value> {
        let mut records = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut object = Map::new();
            for (header, cell) in self.headers.iter().zip(row) {
                let value = serde_json::to_value(cell).context("Failed to convert cell to JSON")?;
                object.insert(header.clone(), value);
            }
            records.push(Value::Object(object));
        }
        Ok(Value::Array(records))
    }

    fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .context("Failed to write CSV header")?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(Cell::to_string))
                .context("Failed to write CSV row")?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}

/// Left-align `s` to `width` terminal columns
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid {
            headers: vec!["項次".to_string(), "qty".to_string()],
            rows: vec![
                vec![Cell::String("1-1".to_string()), Cell::Int(10)],
                vec![Cell::String("12-3".to_string()), Cell::Float(2.5)],
            ],
        }
    }

    #[test]
    fn test_text_table_aligns_wide_chars() {
        colored::control::set_override(false);
        let text = grid().render(OutputFormat::Table).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "項次  qty");
        assert_eq!(lines[1], "----  ---");
        assert_eq!(lines[2], "1-1   10");
        assert_eq!(lines[3], "12-3  2.5");
    }

    #[test]
    fn test_csv_quotes_fields() {
        let grid = Grid {
            headers: vec!["name".to_string()],
            rows: vec![vec![Cell::String("a,b".to_string())]],
        };
        assert_eq!(grid.render(OutputFormat::Csv).unwrap(), "name\n\"a,b\"\n");
    }

    #[test]
    fn test_json_objects() {
        let json: Value = serde_json::from_str(&grid().render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[1]["項次"], "12-3");
        assert_eq!(json[0]["qty"], 10);
        assert_eq!(json[1]["qty"], 2.5);
    }

    #[test]
    fn test_json_keeps_cell_types() {
        let grid = Grid {
            headers: vec!["flag".to_string(), "note".to_string(), "code".to_string()],
            rows: vec![vec![Cell::Bool(true), Cell::Empty, Cell::String("007".to_string())]],
        };
        let json: Value = serde_json::from_str(&grid.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["flag"], Value::Bool(true));
        assert_eq!(json[0]["note"], Value::Null);
        assert_eq!(json[0]["code"], "007");
    }

    #[test]
    fn test_from_rows_limit() {
        let rows = vec![Row::new("1-1", 3.0, 30.0), Row::new("1-2", 1.5, 7.25)];
        let grid = Grid::from_rows(&rows, &ColumnLabels::default(), Some(1));
        assert_eq!(grid.headers, vec!["item", "quantity", "amount"]);
        assert_eq!(
            grid.rows,
            vec![vec![Cell::String("1-1".to_string()), Cell::Float(3.0), Cell::Float(30.0)]]
        );
        assert_eq!(grid.render(OutputFormat::Csv).unwrap(), "item,quantity,amount\n1-1,3,30\n");
    }
}
