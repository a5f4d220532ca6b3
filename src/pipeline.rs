use std::fmt;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::ToolError;
use crate::export::{Download, export};
use crate::io::excel_read;
use crate::model::{Regressor, load_model};
use crate::normalize::normalize_distance_columns;
use crate::predict::predict;
use crate::present::{Preview, present};
use crate::table::Table;

/// Step of the pipeline a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    LoadModel,
    Predict,
    Export,
}

impl Stage {
    /// Headline shown to the user before the underlying error text.
    pub fn headline(self) -> &'static str {
        match self {
            Stage::Read => "The Excel file could not be read. Make sure the format is correct.",
            Stage::LoadModel => "Failed to load the model! Make sure the model path is correct.",
            Stage::Predict => "An error occurred while predicting the data.",
            Stage::Export => "The prediction result could not be exported.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read => write!(f, "read"),
            Stage::LoadModel => write!(f, "load-model"),
            Stage::Predict => write!(f, "predict"),
            Stage::Export => write!(f, "export"),
        }
    }
}

/// A stage failure; its `Display` output is the user-facing message.
#[derive(Debug)]
pub struct Failure {
    pub stage: Stage,
    pub error: ToolError,
}

impl Failure {
    pub fn new(stage: Stage, error: ToolError) -> Self {
        Self { stage, error }
    }

    fn at(stage: Stage) -> impl Fn(ToolError) -> Failure {
        move |error| Failure::new(stage, error)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\nError: {}", self.stage.headline(), self.error)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Everything produced by a successful prediction run.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    /// Full scored table in presentation order; this is what gets exported.
    pub table: Table,
    pub preview: Preview,
    pub download: Download,
    /// Distance columns that were converted from text.
    pub converted_columns: Vec<String>,
}

/// Synchronous load → clean → predict → present → export pass.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses an uploaded workbook.
    #[instrument(level = "info", skip_all, fields(byte_count = bytes.len()))]
    pub fn read_upload(&self, bytes: &[u8]) -> Result<Table, Failure> {
        let table = excel_read::read_table(bytes).map_err(Failure::at(Stage::Read))?;
        info!(
            row_count = table.row_count(),
            column_count = table.column_count(),
            "read uploaded table"
        );
        Ok(table)
    }

    /// Loads the configured model afresh and scores `input`.
    #[instrument(
        level = "info",
        skip_all,
        fields(model = %self.config.model_path.display(), row_count = input.row_count())
    )]
    pub fn run(&self, input: &Table) -> Result<PredictionOutcome, Failure> {
        let model = load_model(&self.config.model_path).map_err(|error| {
            warn!(%error, "model could not be loaded");
            Failure::new(Stage::LoadModel, error)
        })?;
        self.run_with_model(&model, input)
    }

    /// Scores `input` with an already loaded model. The input is never mutated,
    /// so repeated runs with the same model give the same outcome.
    pub fn run_with_model<R: Regressor + ?Sized>(
        &self,
        model: &R,
        input: &Table,
    ) -> Result<PredictionOutcome, Failure> {
        let mut table = input.clone();
        let converted_columns =
            normalize_distance_columns(&mut table).map_err(Failure::at(Stage::Predict))?;
        let scored = predict(model, &table).map_err(Failure::at(Stage::Predict))?;
        info!(row_count = scored.row_count(), "prediction finished");

        let table = present(scored);
        let preview = Preview::new(&table, self.config.preview_rows);
        let download =
            export(&table, &self.config.download_name).map_err(Failure::at(Stage::Export))?;

        Ok(PredictionOutcome {
            table,
            preview,
            download,
            converted_columns,
        })
    }
}
