//! Raw sheet table -> ordered receiving rows

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{ItemKey, ItemKeyError, Row};
use crate::sheet::{Cell, Table};

/// Positions of the item, quantity and amount columns in the raw table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub item: usize,
    pub quantity: usize,
    pub amount: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            item: 0,
            quantity: 1,
            amount: 2,
        }
    }
}

/// Layout parameters of the billing sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Rows with an empty cell in this column are dropped first
    pub required_column: usize,
    /// Header remnants removed after the empty-row filter
    pub skip_head: usize,
    /// Trailing lines (the sheet total) removed after the empty-row filter
    pub skip_tail: usize,
    pub column_map: ColumnMap,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            required_column: 1,
            skip_head: 2,
            skip_tail: 1,
            column_map: ColumnMap::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A configured column position is outside the table
    MissingColumn { position: usize, width: usize },
    /// Item number is not `"<major>-<minor>"`
    MalformedItem {
        row: usize,
        value: String,
        reason: ItemKeyError,
    },
    /// Quantity or amount is not numeric
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::MissingColumn { position, width } => write!(
                f,
                "column position {} is out of range, the table has {} columns",
                position, width
            ),
            TransformError::MalformedItem { row, value, reason } => {
                write!(f, "row {}: malformed item number '{}': {}", row, value, reason)
            }
            TransformError::InvalidNumber { row, field, value } => {
                write!(f, "row {}: {} '{}' is not a number", row, field, value)
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Derive the sorted row table from a raw sheet table.
///
/// Steps, in order: drop rows whose `required_column` is empty, drop
/// `skip_head` leading and `skip_tail` trailing rows, map columns to
/// item/quantity/amount, then sort by item key. The sort is stable, so rows
/// with equal item numbers keep their sheet order.
///
/// Row numbers in errors are zero-based positions in `table.rows`.
pub fn transform_rows(table: &Table, options: &TransformOptions) -> Result<Vec<Row>, TransformError> {
    let width = table.width();
    let map = options.column_map;
    for position in [options.required_column, map.item, map.quantity, map.amount] {
        if position >= width {
            return Err(TransformError::MissingColumn { position, width });
        }
    }

    let kept: Vec<(usize, &Vec<Cell>)> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row[options.required_column].is_empty())
        .collect();

    debug!(
        "{} of {} rows have a value in column {}",
        kept.len(),
        table.len(),
        options.required_column
    );

    let trimmed = options.skip_head + options.skip_tail;
    if kept.len() <= trimmed {
        warn!(
            "Only {} rows left after filtering, nothing remains after skipping {} head and {} tail rows",
            kept.len(),
            options.skip_head,
            options.skip_tail
        );
        return Ok(Vec::new());
    }
    let body = &kept[options.skip_head..kept.len() - options.skip_tail];

    let mut keyed = Vec::with_capacity(body.len());
    for &(row_idx, cells) in body {
        let item_cell = &cells[map.item];
        let item = item_cell.as_text().unwrap_or_default();
        let key = ItemKey::parse(&item).map_err(|reason| TransformError::MalformedItem {
            row: row_idx,
            value: item.clone(),
            reason,
        })?;

        let quantity = number(&cells[map.quantity], row_idx, "quantity")?
            .ok_or_else(|| TransformError::InvalidNumber {
                row: row_idx,
                field: "quantity",
                value: String::new(),
            })?;

        let amount = match number(&cells[map.amount], row_idx, "amount")? {
            Some(amount) => amount,
            None => {
                debug!("Row {} ({}) has no amount, using 0", row_idx, item);
                0.0
            }
        };

        keyed.push((key, Row::new(item, quantity, amount)));
    }

    keyed.sort_by(|(a, _), (b, _)| a.compare(b));

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Empty -> `None`, numeric -> `Some`, anything else is an error
fn number(cell: &Cell, row: usize, field: &'static str) -> Result<Option<f64>, TransformError> {
    if cell.is_empty() {
        return Ok(None);
    }

    cell.as_number()
        .map(Some)
        .ok_or_else(|| TransformError::InvalidNumber {
            row,
            field,
            value: cell.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Cell {
        Cell::String(v.to_string())
    }

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        Table::new(vec!["item".into(), "qty".into(), "amt".into()], rows)
    }

    /// Header remnants, data rows and a total line, the way the billing sheet looks
    fn billing_rows(data: &[(&str, f64, f64)]) -> Vec<Vec<Cell>> {
        let mut rows = vec![
            vec![s("No."), s("Qty"), s("Amount")],
            vec![Cell::Empty, s("(units)"), s("(TWD)")],
        ];
        for (item, qty, amt) in data {
            rows.push(vec![s(item), Cell::Float(*qty), Cell::Float(*amt)]);
        }
        rows.push(vec![s("Total"), Cell::Float(0.0), Cell::Float(999.0)]);
        rows
    }

    #[test]
    fn test_filter_and_slice_counts() {
        // 10 rows, row 2 has no quantity: 9 kept, minus 2 head and 1 tail
        let mut rows = billing_rows(&[
            ("1-1", 1.0, 1.0),
            ("1-2", 1.0, 1.0),
            ("1-3", 1.0, 1.0),
            ("1-4", 1.0, 1.0),
            ("1-5", 1.0, 1.0),
            ("1-6", 1.0, 1.0),
            ("1-7", 1.0, 1.0),
        ]);
        rows[2][1] = Cell::Empty;
        assert_eq!(rows.len(), 10);

        let result = transform_rows(&table(rows), &TransformOptions::default()).unwrap();
        assert_eq!(result.len(), 6);
        assert_eq!(result[0].item, "1-2");
        assert_eq!(result[5].item, "1-7");
    }

    #[test]
    fn test_sorted_numerically_and_stable() {
        let rows = billing_rows(&[
            ("2-10", 1.0, 10.0),
            ("10-1", 2.0, 20.0),
            ("2-9", 3.0, 30.0),
            ("1-1", 4.0, 40.0),
            ("2-9", 5.0, 50.0),
        ]);

        let result = transform_rows(&table(rows), &TransformOptions::default()).unwrap();
        let items: Vec<(&str, f64)> = result.iter().map(|r| (r.item.as_str(), r.quantity)).collect();
        assert_eq!(
            items,
            vec![("1-1", 4.0), ("2-9", 3.0), ("2-9", 5.0), ("2-10", 1.0), ("10-1", 2.0)]
        );
    }

    #[test]
    fn test_custom_offsets_and_mapping() {
        let rows = vec![
            vec![Cell::Float(7.0), s("3-1"), Cell::Float(70.0)],
            vec![Cell::Float(8.0), s("1-1"), Cell::Float(80.0)],
        ];
        let options = TransformOptions {
            required_column: 0,
            skip_head: 0,
            skip_tail: 0,
            column_map: ColumnMap {
                item: 1,
                quantity: 0,
                amount: 2,
            },
        };

        let result = transform_rows(&table(rows), &options).unwrap();
        assert_eq!(result, vec![Row::new("1-1", 8.0, 80.0), Row::new("3-1", 7.0, 70.0)]);
    }

    #[test]
    fn test_malformed_item_is_an_error() {
        let rows = billing_rows(&[("1-1", 1.0, 1.0), ("12", 1.0, 1.0)]);
        let err = transform_rows(&table(rows), &TransformOptions::default()).unwrap_err();

        assert_eq!(
            err,
            TransformError::MalformedItem {
                row: 3,
                value: "12".into(),
                reason: ItemKeyError::MissingSeparator,
            }
        );
    }

    #[test]
    fn test_invalid_quantity_and_empty_amount() {
        let mut rows = billing_rows(&[("1-1", 1.0, 1.0)]);
        rows[2][2] = Cell::Empty;
        let result = transform_rows(&table(rows.clone()), &TransformOptions::default()).unwrap();
        assert_eq!(result[0].amount, 0.0);

        rows[2][1] = s("lots");
        let err = transform_rows(&table(rows), &TransformOptions::default()).unwrap_err();
        assert!(matches!(err, TransformError::InvalidNumber { field: "quantity", .. }));
    }

    #[test]
    fn test_too_few_rows_yields_empty() {
        let rows = vec![
            vec![s("No."), s("Qty"), s("Amount")],
            vec![s("Total"), Cell::Float(0.0), Cell::Float(0.0)],
        ];
        let result = transform_rows(&table(rows), &TransformOptions::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_column_out_of_range() {
        let options = TransformOptions {
            column_map: ColumnMap {
                item: 0,
                quantity: 1,
                amount: 5,
            },
            ..Default::default()
        };
        let err = transform_rows(&table(Vec::new()), &options).unwrap_err();
        assert_eq!(err, TransformError::MissingColumn { position: 5, width: 3 });
    }
}
