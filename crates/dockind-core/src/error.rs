//! Error types for feature extraction and classification

use thiserror::Error;

/// Failures while deriving features from a PDF
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read PDF: {0}")]
    DocumentUnreadable(String),

    #[error("Render or text recognition failed: {0}")]
    RenderOrRecognition(String),
}

/// Failures while loading or applying the trained model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Schema(String),

    #[error("Model references unknown feature column: {0}")]
    UnknownFeature(String),
}

/// Failures surfaced by the classification boundary
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Feature extraction failed: {0}")]
    FeatureExtractionFailed(#[from] ExtractError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ModelError),
}
