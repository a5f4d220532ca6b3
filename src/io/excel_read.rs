use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::table::{Cell, Table};

/// Parses an uploaded workbook into a [`Table`].
///
/// The first worksheet is read and its first row becomes the header. Header
/// cells are normalised so every column has a unique, non-empty name.
pub fn read_table(bytes: &[u8]) -> Result<Table> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::Parse("workbook does not contain any worksheet".into()))??;

    let table = range_to_table(&range);
    debug!(
        row_count = table.row_count(),
        column_count = table.column_count(),
        "worksheet parsed"
    );
    Ok(table)
}

/// Reads a workbook from disk. See [`read_table`].
pub fn read_table_from_path(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    read_table(&bytes)
}

fn range_to_table(range: &Range<DataType>) -> Table {
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(first_row) => unique_headers(first_row),
        None => return Table::new(),
    };

    let body = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    Table::from_rows(headers, body)
}

fn unique_headers(row: &[DataType]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(row.len());

    for (index, cell) in row.iter().enumerate() {
        let mut name = cell_to_string(cell);
        if name.trim().is_empty() {
            name = format!("Unnamed: {index}");
        }

        if seen.contains(&name) {
            let mut counter = 1;
            loop {
                let candidate = format!("{name}.{counter}");
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
                counter += 1;
            }
        }

        seen.insert(name.clone());
        headers.push(name);
    }

    headers
}

fn data_to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(value) => Cell::DateTime(*value),
        other => Cell::Text(other.to_string()),
    }
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}
