#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use harga_tools::table::{Cell, Table};
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};

pub fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

pub fn num(value: f64) -> Cell {
    Cell::Number(value)
}

pub fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
    Table::from_rows(headers.iter().map(|h| h.to_string()).collect(), rows)
}

/// Builds an xlsx upload independently of the crate's own writer.
pub fn xlsx_bytes(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("header written");
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Number(value) | Cell::DateTime(value) => {
                    worksheet.write_number(row_num, col, *value).expect("number");
                }
                Cell::Text(value) => {
                    worksheet.write_string(row_num, col, value).expect("string");
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row_num, col, *value).expect("bool");
                }
            }
        }
    }

    workbook.save_to_buffer().expect("workbook encoded")
}

/// Three property records; `Dist_SPBU` is grouped text in every row.
pub fn sample_upload() -> Vec<u8> {
    xlsx_bytes(
        &["NOP", "Luas", "Dist_SPBU", "Dist_Shop"],
        &[
            vec![text("NOP-001"), num(120.0), text("1,000"), num(250.0)],
            vec![text("NOP-002"), num(80.0), text("2,500"), num(40.0)],
            vec![text("NOP-003"), num(200.0), text("750"), num(1200.0)],
        ],
    )
}

/// `price = 1000 + 2 * Dist_SPBU + 10 * Luas`.
pub fn linear_model() -> Value {
    json!({
        "name": "linear-test",
        "target": "Harga",
        "features": [
            {"column": "Dist_SPBU"},
            {"column": "Luas"}
        ],
        "estimator": {
            "kind": "linear",
            "intercept": 1000.0,
            "coefficients": [2.0, 10.0]
        }
    })
}

pub fn write_model(dir: &Path, file_name: &str, model: &Value) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_string_pretty(model).expect("model serialised"))
        .expect("model written");
    path
}
