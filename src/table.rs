//! In-memory tabular representation shared by every stage of the pipeline.

use std::fmt;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell; treated as a missing value.
    Empty,
    /// Floating point number.
    Number(f64),
    /// Text literal.
    Text(String),
    /// Boolean literal.
    Bool(bool),
    /// Date or time stored as an Excel serial number.
    DateTime(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::DateTime(value) => write!(f, "{value}"),
        }
    }
}

/// A named column. All columns of a [`Table`] hold the same number of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A column is textual as soon as one of its cells holds text, mirroring
    /// how dataframe libraries fall back to an object column.
    pub fn is_textual(&self) -> bool {
        self.cells.iter().any(|cell| matches!(cell, Cell::Text(_)))
    }
}

/// Ordered collection of equally sized columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from row-major data. Rows shorter than the header are
    /// padded with [`Cell::Empty`]; extra trailing cells are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let row_count = rows.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(row_count)))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(Cell::Empty));
            }
        }

        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Replaces the cells of the named column. The replacement must have one
    /// cell per row; otherwise it is handed back unchanged.
    pub fn replace_cells(
        &mut self,
        name: &str,
        cells: Vec<Cell>,
    ) -> std::result::Result<(), Vec<Cell>> {
        if cells.len() != self.row_count {
            return Err(cells);
        }
        match self.column_mut(name) {
            Some(column) => {
                column.cells = cells;
                Ok(())
            }
            None => Err(cells),
        }
    }

    /// Appends a column. An empty table adopts the length of its first column;
    /// afterwards the length must match.
    pub fn push_column(&mut self, column: Column) -> std::result::Result<(), Column> {
        if self.columns.is_empty() && self.row_count == 0 {
            self.row_count = column.cells.len();
        } else if column.cells.len() != self.row_count {
            return Err(column);
        }
        self.columns.push(column);
        Ok(())
    }

    /// Removes and returns the named column.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.position(name)?;
        Some(self.columns.remove(index))
    }

    /// Renames a column in place. Returns false when `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_mut(from) {
            Some(column) => {
                column.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Moves the named column to the front. Returns false when it does not exist.
    pub fn move_to_front(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                let column = self.columns.remove(index);
                self.columns.insert(0, column);
                true
            }
            None => false,
        }
    }

    /// Copies the first `n` rows, or the whole table when it is shorter.
    pub fn head(&self, n: usize) -> Table {
        let take = n.min(self.row_count);
        let columns = self
            .columns
            .iter()
            .map(|column| Column::new(column.name.clone(), column.cells[..take].to_vec()))
            .collect();
        Table {
            columns,
            row_count: take,
        }
    }
}
