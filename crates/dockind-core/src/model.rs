//! Trained model loading and prediction
//!
//! Models are shipped as JSON artifacts exported from the training
//! pipeline: class labels, the feature columns the model was fitted on,
//! and one coefficient row per decision function. Binary models carry a
//! single row and follow the usual convention that a positive score
//! selects the second class.

use crate::error::ModelError;
use crate::features::FeatureRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Maps a feature record to a raw class label
pub trait Predictor: Send + Sync {
    fn predict(&self, record: &FeatureRecord) -> Result<String, ModelError>;
}

/// Linear classifier restored from a JSON artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// Class labels in training order
    pub classes: Vec<String>,
    /// Feature columns in coefficient order
    pub feature_names: Vec<String>,
    /// One row per decision function
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    /// Load and validate an artifact from disk
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let data = std::fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&data)?;
        model.validate()?;
        tracing::debug!(
            "loaded model with classes {:?} over {} features",
            model.classes,
            model.feature_names.len()
        );
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.classes.len() < 2 {
            return Err(ModelError::Schema(format!(
                "model must define at least two classes, found {}",
                self.classes.len()
            )));
        }
        if self.feature_names.is_empty() {
            return Err(ModelError::Schema(
                "model defines no feature columns".to_string(),
            ));
        }

        let expected_rows = if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        };
        if self.coefficients.len() != expected_rows {
            return Err(ModelError::Schema(format!(
                "expected {} coefficient rows for {} classes, found {}",
                expected_rows,
                self.classes.len(),
                self.coefficients.len()
            )));
        }
        for row in &self.coefficients {
            if row.len() != self.feature_names.len() {
                return Err(ModelError::Schema(format!(
                    "coefficient row has {} entries for {} feature columns",
                    row.len(),
                    self.feature_names.len()
                )));
            }
        }
        if self.intercepts.len() != self.coefficients.len() {
            return Err(ModelError::Schema(format!(
                "expected {} intercepts, found {}",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }

        Ok(())
    }

    fn decision_scores(&self, record: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        let input: Vec<f64> = self
            .feature_names
            .iter()
            .map(|name| {
                record
                    .column(name)
                    .ok_or_else(|| ModelError::UnknownFeature(name.clone()))
            })
            .collect::<Result<_, _>>()?;

        let scores = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                row.iter().zip(&input).map(|(w, x)| w * x).sum::<f64>() + intercept
            })
            .collect();

        Ok(scores)
    }
}

impl Predictor for LinearModel {
    fn predict(&self, record: &FeatureRecord) -> Result<String, ModelError> {
        let scores = self.decision_scores(record)?;

        let index = if self.classes.len() == 2 {
            let score = scores
                .first()
                .copied()
                .ok_or_else(|| ModelError::Schema("model produced no scores".to_string()))?;
            usize::from(score > 0.0)
        } else {
            scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
                .map(|(i, _)| i)
                .ok_or_else(|| ModelError::Schema("model produced no scores".to_string()))?
        };

        let label = self
            .classes
            .get(index)
            .cloned()
            .ok_or_else(|| {
                ModelError::Schema("coefficient rows do not match class count".to_string())
            })?;
        tracing::debug!("scores {:?} selected label {}", scores, label);
        Ok(label)
    }
}
