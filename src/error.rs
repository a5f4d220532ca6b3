use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while a
/// spreadsheet is read, cleaned, scored, or exported.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading uploads or writing downloads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded bytes could not be parsed as a spreadsheet.
    #[error("spreadsheet could not be read: {0}")]
    Parse(String),

    /// The uploaded file does not carry the accepted extension.
    #[error("unsupported upload '{0}': only .xlsx files are accepted")]
    UnsupportedUpload(String),

    /// The model artifact is missing, corrupt, or structurally invalid.
    #[error("model could not be loaded from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A distance column value could not be converted to a number.
    #[error("could not convert '{value}' to a number in column {column} (row {row})")]
    Conversion {
        column: String,
        row: usize,
        value: String,
    },

    /// Inference failed; no partial result is produced.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// The prediction table could not be encoded as a spreadsheet.
    #[error("export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when the configuration is incomplete or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when a session transition is requested from the wrong state.
    #[error("cannot {action} while the session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// A pipeline stage failed; carries the user-facing message.
    #[error("{0}")]
    StageFailed(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl From<calamine::XlsxError> for ToolError {
    fn from(error: calamine::XlsxError) -> Self {
        ToolError::Parse(error.to_string())
    }
}
