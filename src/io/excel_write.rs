use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::table::{Cell, Table};

/// Name of the single worksheet written by this module.
pub const SHEET_NAME: &str = "Sheet1";

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Encodes the table as an xlsx workbook held entirely in memory.
pub fn write_table_to_buffer(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(table: &Table) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet.write_string_with_format(0, col, &column.name, &header_format)?;

        for (row_idx, cell) in column.cells().iter().enumerate() {
            write_cell(worksheet, (row_idx + 1) as u32, col, cell, &datetime_format)?;
        }
    }

    Ok(workbook)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    datetime_format: &Format,
) -> Result<()> {
    match cell {
        // Non-finite numbers have no xlsx encoding; they stay blank like missing values.
        Cell::Empty => {}
        Cell::Number(value) if !value.is_finite() => {}
        Cell::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
        Cell::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        Cell::DateTime(value) => {
            worksheet.write_number_with_format(row, col, *value, datetime_format)?;
        }
    }
    Ok(())
}
