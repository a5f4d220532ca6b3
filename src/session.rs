//! Session state machine, independent of any rendering layer.
//!
//! ```text
//! Idle --upload--> Loaded --begin_prediction--> Predicting --finish--> Done | Failed
//! ```
//!
//! A new upload is accepted in every state. Prediction can be re-triggered from
//! `Done`, and from `Failed` as long as a table was loaded before the failure.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::export::Download;
use crate::pipeline::{Failure, Pipeline, PredictionOutcome, Stage};
use crate::present::Preview;
use crate::table::Table;

const ACCEPTED_EXTENSION: &str = "xlsx";

/// A successfully parsed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub table: Table,
}

#[derive(Debug, Default)]
pub enum Session {
    /// Nothing uploaded yet.
    #[default]
    Idle,
    /// A table is loaded and can be scored.
    Loaded(Upload),
    /// The pipeline is running for the loaded table.
    Predicting(Upload),
    /// The last run succeeded; the download is available.
    Done {
        upload: Upload,
        outcome: PredictionOutcome,
    },
    /// The last action failed. `upload` is kept when the failure happened after
    /// a table had been loaded.
    Failed {
        upload: Option<Upload>,
        failure: Failure,
    },
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::Loaded(_) => "loaded",
            Session::Predicting(_) => "predicting",
            Session::Done { .. } => "done",
            Session::Failed { .. } => "failed",
        }
    }

    /// Accepts a new upload, replacing whatever the session held before.
    pub fn upload(&mut self, pipeline: &Pipeline, file_name: &str, bytes: &[u8]) {
        let next = if !has_accepted_extension(file_name) {
            Session::Failed {
                upload: None,
                failure: Failure::new(
                    Stage::Read,
                    ToolError::UnsupportedUpload(file_name.to_string()),
                ),
            }
        } else {
            match pipeline.read_upload(bytes) {
                Ok(table) => Session::Loaded(Upload {
                    file_name: file_name.to_string(),
                    table,
                }),
                Err(failure) => Session::Failed {
                    upload: None,
                    failure,
                },
            }
        };

        debug!(from = self.state_name(), to = next.state_name(), "upload");
        *self = next;
    }

    /// Moves a loaded session into `Predicting`.
    pub fn begin_prediction(&mut self) -> Result<()> {
        let upload = match std::mem::take(self) {
            Session::Loaded(upload)
            | Session::Done { upload, .. }
            | Session::Failed {
                upload: Some(upload),
                ..
            } => upload,
            other => {
                let state = other.state_name();
                *self = other;
                return Err(ToolError::InvalidTransition {
                    action: "start a prediction",
                    state,
                });
            }
        };

        *self = Session::Predicting(upload);
        Ok(())
    }

    /// Records the result of the running prediction.
    pub fn finish(&mut self, result: std::result::Result<PredictionOutcome, Failure>) -> Result<()> {
        let upload = match std::mem::take(self) {
            Session::Predicting(upload) => upload,
            other => {
                let state = other.state_name();
                *self = other;
                return Err(ToolError::InvalidTransition {
                    action: "finish a prediction",
                    state,
                });
            }
        };

        *self = match result {
            Ok(outcome) => {
                info!(row_count = outcome.table.row_count(), "prediction done");
                Session::Done { upload, outcome }
            }
            Err(failure) => {
                info!(stage = %failure.stage, "prediction failed");
                Session::Failed {
                    upload: Some(upload),
                    failure,
                }
            }
        };
        Ok(())
    }

    /// Runs the whole prediction synchronously: begin, run, finish.
    pub fn trigger(&mut self, pipeline: &Pipeline) -> Result<()> {
        self.begin_prediction()?;
        let Session::Predicting(upload) = self else {
            return Ok(());
        };
        let result = pipeline.run(&upload.table);
        self.finish(result)
    }

    /// The loaded table, if any state still holds one.
    pub fn table(&self) -> Option<&Table> {
        match self {
            Session::Loaded(upload)
            | Session::Predicting(upload)
            | Session::Done { upload, .. }
            | Session::Failed {
                upload: Some(upload),
                ..
            } => Some(&upload.table),
            _ => None,
        }
    }

    /// Preview of the uploaded table.
    pub fn input_preview(&self, rows: usize) -> Option<Preview> {
        self.table().map(|table| Preview::new(table, rows))
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match self {
            Session::Done { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// The download is only offered after a successful run.
    pub fn download(&self) -> Option<&Download> {
        self.outcome().map(|outcome| &outcome.download)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Session::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

fn has_accepted_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(ACCEPTED_EXTENSION))
}
