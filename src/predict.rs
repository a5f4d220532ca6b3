//! Applies a model to a cleaned table.

use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::Regressor;
use crate::table::{Cell, Column, Table};

/// Column name under which the model's output is first attached.
pub const PREDICTION_LABEL: &str = "prediction_label";
/// Presentation name of the prediction column.
pub const PREDICTION_COLUMN: &str = "Harga_Prediksi";
/// Predictions are rounded to this many decimal places.
pub const ROUND_DIGITS: i32 = 4;

/// Scores every row of `table` and returns a copy with the prediction column
/// appended as [`PREDICTION_COLUMN`].
///
/// Row count and order are preserved. A prediction column already present in
/// the input (for example when a previous export is scored again) is replaced.
pub fn predict<R: Regressor + ?Sized>(model: &R, table: &Table) -> Result<Table> {
    let predictions = model.predict_rows(table)?;
    if predictions.len() != table.row_count() {
        return Err(ToolError::Prediction(format!(
            "model returned {} predictions for {} rows",
            predictions.len(),
            table.row_count()
        )));
    }

    let cells = predictions
        .into_iter()
        .map(|value| Cell::Number(round(value)))
        .collect();

    let mut scored = table.clone();
    scored.remove_column(PREDICTION_LABEL);
    scored.remove_column(PREDICTION_COLUMN);
    scored
        .push_column(Column::new(PREDICTION_LABEL, cells))
        .map_err(|column| {
            ToolError::Prediction(format!(
                "prediction column has {} rows, table has {}",
                column.len(),
                table.row_count()
            ))
        })?;

    if scored.rename_column(PREDICTION_LABEL, PREDICTION_COLUMN) {
        debug!(column = PREDICTION_COLUMN, "renamed prediction label");
    }

    Ok(scored)
}

fn round(value: f64) -> f64 {
    let factor = 10f64.powi(ROUND_DIGITS);
    (value * factor).round() / factor
}
