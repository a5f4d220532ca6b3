//! Column ordering and the head-only preview shown to the user.

use std::fmt;

use crate::predict::PREDICTION_COLUMN;
use crate::table::Table;

/// Record identifier column.
pub const IDENTIFIER_COLUMN: &str = "NOP";
/// Number of rows shown in a preview unless configured otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Puts the identifier first and the prediction second.
///
/// Only applies when both columns exist; otherwise the order is left alone.
pub fn present(mut table: Table) -> Table {
    if table.position(IDENTIFIER_COLUMN).is_some() && table.position(PREDICTION_COLUMN).is_some()
    {
        table.move_to_front(PREDICTION_COLUMN);
        table.move_to_front(IDENTIFIER_COLUMN);
    }
    table
}

/// The leading rows of a table, rendered as a fixed-width text grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub head: Table,
    pub total_rows: usize,
}

impl Preview {
    pub fn new(table: &Table, rows: usize) -> Self {
        Self {
            head: table.head(rows),
            total_rows: table.row_count(),
        }
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.head.columns();
        let rendered: Vec<Vec<String>> = columns
            .iter()
            .map(|column| column.cells().iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .zip(&rendered)
            .map(|(column, cells)| {
                cells
                    .iter()
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| format!("{:<width$}", column.name))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;

        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in 0..self.head.row_count() {
            let line: Vec<String> = rendered
                .iter()
                .zip(&widths)
                .map(|(cells, &width)| format!("{:<width$}", cells[row]))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }

        write!(
            f,
            "({} of {} rows shown)",
            self.head.row_count(),
            self.total_rows
        )
    }
}
