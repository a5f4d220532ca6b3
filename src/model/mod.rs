//! Trained regression model artifacts.
//!
//! A model is produced by an external training pipeline and persisted as a
//! JSON document. This module only deserializes it, checks that the structure
//! is internally consistent, and evaluates it row by row. No attempt is made to
//! check that the model suits the table it is applied to; that surfaces as a
//! prediction error instead.

mod tree;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::table::{Cell, Table};

pub use tree::{Tree, TreeNode};

/// Extension appended to the configured path when it does not name a file.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Anything able to score every row of a table.
pub trait Regressor {
    /// Returns one prediction per row of `table`, in row order.
    fn predict_rows(&self, table: &Table) -> Result<Vec<f64>>;
}

/// Input column consumed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Column name in the input table.
    pub column: String,
    /// Replacement for missing values. Without it a missing value is an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<f64>,
    /// Numeric codes for textual values of categorical columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, f64>>,
}

/// The fitted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Mean of independent regression trees.
    RandomForest { trees: Vec<Tree> },
    /// `base_score + learning_rate * sum(trees)`.
    GradientBoosting {
        base_score: f64,
        learning_rate: f64,
        trees: Vec<Tree>,
    },
    /// `intercept + coefficients · x`.
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::RandomForest { .. } => "random_forest",
            Estimator::GradientBoosting { .. } => "gradient_boosting",
            Estimator::Linear { .. } => "linear",
        }
    }

    fn validate(&self, feature_count: usize) -> std::result::Result<(), String> {
        match self {
            Estimator::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".into());
                }
                validate_trees(trees, feature_count)
            }
            Estimator::GradientBoosting {
                base_score,
                learning_rate,
                trees,
            } => {
                if !base_score.is_finite() || !learning_rate.is_finite() {
                    return Err("gradient boosting parameters must be finite".into());
                }
                validate_trees(trees, feature_count)
            }
            Estimator::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != feature_count {
                    return Err(format!(
                        "linear model has {} coefficients for {feature_count} features",
                        coefficients.len()
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("linear model parameters must be finite".into());
                }
                Ok(())
            }
        }
    }

    fn evaluate(&self, features: &[f64]) -> f64 {
        match self {
            Estimator::RandomForest { trees } => {
                let sum: f64 = trees.iter().map(|tree| tree.evaluate(features)).sum();
                sum / trees.len() as f64
            }
            Estimator::GradientBoosting {
                base_score,
                learning_rate,
                trees,
            } => {
                let sum: f64 = trees.iter().map(|tree| tree.evaluate(features)).sum();
                base_score + learning_rate * sum
            }
            Estimator::Linear {
                intercept,
                coefficients,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(features)
                        .map(|(coefficient, value)| coefficient * value)
                        .sum::<f64>()
            }
        }
    }
}

fn validate_trees(trees: &[Tree], feature_count: usize) -> std::result::Result<(), String> {
    for (index, tree) in trees.iter().enumerate() {
        tree.validate(feature_count)
            .map_err(|reason| format!("tree {index}: {reason}"))?;
    }
    Ok(())
}

/// A deserialized model. [`load_model`] validates it on the way in and
/// scoring validates it again, so a hand-built artifact cannot panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Human readable model name.
    pub name: String,
    /// Label column the model was trained on, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Ordered model inputs.
    pub features: Vec<Feature>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Checks internal consistency of the artifact.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.features.is_empty() {
            return Err("model declares no features".into());
        }
        if let Some(feature) = self
            .features
            .iter()
            .find(|feature| feature.fill.is_some_and(|fill| !fill.is_finite()))
        {
            return Err(format!("fill value of feature {} is not finite", feature.column));
        }
        self.estimator.validate(self.features.len())
    }

    fn feature_matrix(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        let mut matrix = vec![Vec::with_capacity(self.features.len()); table.row_count()];

        for feature in &self.features {
            let column = table.column(&feature.column).ok_or_else(|| {
                ToolError::Prediction(format!(
                    "column {} required by the model is missing",
                    feature.column
                ))
            })?;

            for (row, cell) in column.cells().iter().enumerate() {
                matrix[row].push(feature_value(feature, row, cell)?);
            }
        }

        Ok(matrix)
    }
}

fn feature_value(feature: &Feature, row: usize, cell: &Cell) -> Result<f64> {
    match cell {
        Cell::Empty => missing_value(feature, row),
        Cell::Number(value) if value.is_nan() => missing_value(feature, row),
        Cell::Number(value) | Cell::DateTime(value) => Ok(*value),
        Cell::Bool(value) => Ok(if *value { 1.0 } else { 0.0 }),
        Cell::Text(value) => feature
            .categories
            .as_ref()
            .and_then(|categories| categories.get(value).copied())
            .ok_or_else(|| {
                ToolError::Prediction(format!(
                    "unexpected value '{value}' in column {} (row {row})",
                    feature.column
                ))
            }),
    }
}

fn missing_value(feature: &Feature, row: usize) -> Result<f64> {
    feature.fill.ok_or_else(|| {
        ToolError::Prediction(format!(
            "missing value in column {} (row {row})",
            feature.column
        ))
    })
}

impl Regressor for ModelArtifact {
    fn predict_rows(&self, table: &Table) -> Result<Vec<f64>> {
        // Artifacts can be built or deserialized without going through `load_model`.
        self.validate()
            .map_err(|reason| ToolError::Prediction(format!("invalid model: {reason}")))?;
        let matrix = self.feature_matrix(table)?;
        Ok(matrix
            .iter()
            .map(|features| self.estimator.evaluate(features))
            .collect())
    }
}

/// Loads and validates the model artifact stored at `path`.
///
/// When `path` does not exist, the same path with a `.json` suffix is tried.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    let resolved = resolve_artifact_path(path);
    let load_error = |reason: String| ToolError::Load {
        path: resolved.clone(),
        reason,
    };

    let source = std::fs::read_to_string(&resolved).map_err(|err| load_error(err.to_string()))?;
    let model: ModelArtifact =
        serde_json::from_str(&source).map_err(|err| load_error(err.to_string()))?;
    model.validate().map_err(load_error)?;

    info!(
        name = %model.name,
        estimator = model.estimator.kind(),
        feature_count = model.features.len(),
        "model loaded"
    );
    Ok(model)
}

/// Returns `path` when it exists, otherwise `path` with the artifact extension
/// appended.
pub fn resolve_artifact_path(path: &Path) -> PathBuf {
    if path.is_file() {
        return path.to_path_buf();
    }
    let mut with_extension = OsString::from(path.as_os_str());
    with_extension.push(".");
    with_extension.push(ARTIFACT_EXTENSION);
    PathBuf::from(with_extension)
}
