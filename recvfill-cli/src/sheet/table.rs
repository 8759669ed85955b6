//! In-memory worksheet table

use serde::Serialize;

use super::{Cell, column_letter};

/// Rows of cells under a header of column names.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Type inferred from the non-empty cells of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Empty,
    Integer,
    Float,
    Text,
    Bool,
    DateTime,
    Mixed,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Empty => write!(f, "empty"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Spreadsheet letter of the column's position in the table
    pub letter: String,
    pub inferred_type: ColumnType,
    pub empty_count: usize,
}

/// Summary of a sheet as read with default options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetInfo {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Remove rows where every cell is empty
    pub fn drop_empty_rows(&mut self) {
        self.rows.retain(|row| !row.iter().all(Cell::is_empty));
    }

    /// Remove columns where every cell is empty
    pub fn drop_empty_columns(&mut self) {
        let keep: Vec<bool> = (0..self.width())
            .map(|col| !self.column(col).all(Cell::is_empty))
            .collect();

        let mut keep_iter = keep.iter();
        self.columns.retain(|_| *keep_iter.next().unwrap_or(&true));

        for row in &mut self.rows {
            let mut keep_iter = keep.iter();
            row.retain(|_| *keep_iter.next().unwrap_or(&true));
        }
    }

    /// Replace every remaining empty cell with `value`
    pub fn fill_empty(&mut self, value: &Cell) {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_empty() {
                *cell = value.clone();
            }
        }
    }

    pub fn infer_column_type(&self, index: usize) -> ColumnType {
        let mut inferred = ColumnType::Empty;

        for cell in self.column(index) {
            let cell_type = match cell {
                Cell::Empty => continue,
                Cell::String(_) => ColumnType::Text,
                Cell::Int(_) => ColumnType::Integer,
                Cell::Float(_) => ColumnType::Float,
                Cell::Bool(_) => ColumnType::Bool,
                Cell::DateTime(_) => ColumnType::DateTime,
            };

            inferred = match (inferred, cell_type) {
                (ColumnType::Empty, t) => t,
                (a, b) if a == b => a,
                // Integers widen to floats the way a numeric column would
                (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                    ColumnType::Float
                }
                _ => return ColumnType::Mixed,
            };
        }

        inferred
    }

    pub fn info(&self, name: &str) -> SheetInfo {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| ColumnInfo {
                name: column.clone(),
                letter: column_letter(i),
                inferred_type: self.infer_column_type(i),
                empty_count: self.column(i).filter(|c| c.is_empty()).count(),
            })
            .collect();

        SheetInfo {
            name: name.to_string(),
            row_count: self.len(),
            column_count: self.width(),
            columns,
        }
    }
}

/// Turn raw header cells into unique column names.
///
/// Blank headers become `Unnamed: <position>`, repeats get `.1`, `.2`, ... suffixes.
pub(crate) fn header_names(cells: &[Cell]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());

    for (i, cell) in cells.iter().enumerate() {
        let base = cell
            .as_text()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Unnamed: {}", i));

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }

    names
}
