use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ToolError};
use crate::export::DOWNLOAD_FILE_NAME;
use crate::present::DEFAULT_PREVIEW_ROWS;

/// Settings injected into the pipeline at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Location of the model artifact, with or without its `.json` extension.
    pub model_path: PathBuf,
    /// Number of leading rows shown in previews.
    pub preview_rows: usize,
    /// File name of the download artifact.
    pub download_name: String,
}

/// On-disk representation of [`Config`]; every field is optional so command
/// line flags can fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub model_path: Option<PathBuf>,
    pub preview_rows: Option<usize>,
    pub download_name: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        serde_json::from_str(&source)
            .map_err(|err| ToolError::Config(format!("{}: {err}", path.display())))
    }
}

impl Config {
    /// Configuration with defaults for everything except the model location.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            download_name: DOWNLOAD_FILE_NAME.to_string(),
        }
    }

    /// Merges an optional config file with an explicit model path, the latter
    /// taking precedence.
    pub fn resolve(file: Option<ConfigFile>, model_path: Option<PathBuf>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let model_path = model_path
            .or(file.model_path)
            .ok_or_else(|| ToolError::Config("no model path configured".into()))?;

        let mut config = Config::new(model_path);
        if let Some(rows) = file.preview_rows {
            config.preview_rows = rows;
        }
        if let Some(name) = file.download_name {
            if name.trim().is_empty() {
                return Err(ToolError::Config("download name must not be empty".into()));
            }
            config.download_name = name;
        }
        Ok(config)
    }
}
