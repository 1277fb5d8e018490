//! PDF document classification
//!
//! This crate derives a fixed schema of layout and text-density features
//! from a PDF and applies a trained linear model to decide whether the
//! file is a text document or a slide deck.
//!
//! The pipeline has three stages:
//! - `inspect`: page count, MediaBox geometry and rotation flags via lopdf
//! - `density`: OCR word counts over a bounded leading page range
//! - `model` / `classify`: trained model application and label folding

pub mod classify;
pub mod density;
pub mod error;
pub mod features;
pub mod inspect;
pub mod model;

pub use classify::{Category, Classifier, PdfClassifier};
pub use density::{ocr_available, DensityEstimator, PageRasterizer, TextRecognizer};
pub use error::{ClassifyError, ExtractError, ModelError};
pub use features::{ExtractOptions, FeatureExtractor, FeatureRecord};
pub use inspect::{page_records, survey_file, survey_mem, PageRecord, PageSurvey};
pub use model::{LinearModel, Predictor};

use std::path::Path;

/// Classify the PDF at `pdf_path` using the model artifact at
/// `model_path`, with default extraction settings. Expects `pdftoppm`
/// and `tesseract` on PATH.
pub fn classify_with_artifact(
    pdf_path: &Path,
    model_path: &Path,
) -> Result<Category, ClassifyError> {
    let model = LinearModel::from_path(model_path)?;
    let classifier = PdfClassifier::new(FeatureExtractor::default(), Box::new(model));
    classifier.classify_file(pdf_path)
}
