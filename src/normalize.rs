//! Cleaning of distance columns that arrive as comma-grouped text.

use tracing::debug;

use crate::error::{Result, ToolError};
use crate::table::{Cell, Table};

/// Distance-metric columns coerced to numbers when they are read as text.
pub const DISTANCE_COLUMNS: [&str; 10] = [
    "Dist_Fasum",
    "Dist_Shop",
    "Dist_Faskes",
    "Dist_SPBU",
    "Dist_Trans",
    "Dist_Hotel",
    "Dist_Govt",
    "Dist_Sekol",
    "Dist_Trunk",
    "Dist_Sec",
];

/// Converts every textual distance column of `table` into a numeric one.
///
/// Text cells lose their grouping commas and are parsed as `f64`; numbers and
/// blanks are kept. Columns that are absent or already numeric are untouched.
/// Returns the names of the converted columns.
pub fn normalize_distance_columns(table: &mut Table) -> Result<Vec<String>> {
    let mut converted = Vec::new();

    for name in DISTANCE_COLUMNS {
        let Some(column) = table.column(name) else {
            continue;
        };
        if !column.is_textual() {
            continue;
        }

        let cells = column
            .cells()
            .iter()
            .enumerate()
            .map(|(row, cell)| convert_cell(name, row, cell))
            .collect::<Result<Vec<_>>>()?;
        if table.replace_cells(name, cells).is_err() {
            return Err(ToolError::Prediction(format!(
                "column {name} changed length while converting"
            )));
        }

        debug!(column = name, "converted textual distance column");
        converted.push(name.to_string());
    }

    Ok(converted)
}

/// Strips grouping commas and parses the remainder as a finite float.
/// Spellings such as `inf` or `NaN` are rejected.
pub fn parse_grouped_number(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|ch| *ch != ',').collect();
    stripped
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn convert_cell(column: &str, row: usize, cell: &Cell) -> Result<Cell> {
    match cell {
        Cell::Empty => Ok(Cell::Empty),
        Cell::Number(value) => Ok(Cell::Number(*value)),
        Cell::Text(raw) => parse_grouped_number(raw)
            .map(Cell::Number)
            .ok_or_else(|| conversion_error(column, row, raw.clone())),
        other => Err(conversion_error(column, row, other.to_string())),
    }
}

fn conversion_error(column: &str, row: usize, value: String) -> ToolError {
    ToolError::Conversion {
        column: column.to_string(),
        row,
        value,
    }
}
