//! Fixed-schema feature records and the extraction pipeline
//!
//! A [`FeatureRecord`] is the complete set of signals derived from one
//! PDF. The schema is fixed: model artifacts select their input columns
//! from it by name, so renaming a field here is a breaking change for
//! every trained model.

use crate::density::{
    DensityEstimator, PopplerRasterizer, TesseractRecognizer, DEFAULT_DPI, DEFAULT_OCR_LANGUAGE,
};
use crate::error::ExtractError;
use crate::inspect;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of leading pages sampled for OCR when none is configured
pub const DEFAULT_OCR_PAGE_LIMIT: u32 = 10;

/// Signals derived from a single PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Total page count
    pub num_pages: u64,
    /// Mean page width in points, truncated toward zero
    pub average_width: i64,
    /// Mean page height in points, truncated toward zero
    pub average_height: i64,
    /// True only when every page carries a non-zero rotation
    pub all_pages_rotated: bool,
    /// Mean OCR word count over the sampled page prefix
    pub average_word_count: i64,
}

impl FeatureRecord {
    /// Look up a feature by column name, as model artifacts do.
    /// Booleans map to 1.0 and 0.0.
    pub fn column(&self, name: &str) -> Option<f64> {
        match name {
            "num_pages" => Some(self.num_pages as f64),
            "average_width" => Some(self.average_width as f64),
            "average_height" => Some(self.average_height as f64),
            "all_pages_rotated" => Some(if self.all_pages_rotated { 1.0 } else { 0.0 }),
            "average_word_count" => Some(self.average_word_count as f64),
            _ => None,
        }
    }
}

/// Tuning knobs for feature extraction
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Highest page number sampled for OCR
    pub ocr_page_limit: u32,
    /// Render resolution handed to the rasterizer
    pub dpi: u32,
    /// Language handed to the recognizer
    pub ocr_language: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            ocr_page_limit: DEFAULT_OCR_PAGE_LIMIT,
            dpi: DEFAULT_DPI,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

/// Derives a [`FeatureRecord`] from a PDF on disk
pub struct FeatureExtractor {
    estimator: DensityEstimator,
    ocr_page_limit: u32,
}

impl FeatureExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        let estimator = DensityEstimator::new(
            Box::new(PopplerRasterizer::new(options.dpi)),
            Box::new(TesseractRecognizer::new(options.ocr_language)),
        );
        Self {
            estimator,
            ocr_page_limit: options.ocr_page_limit,
        }
    }

    /// Build an extractor around a caller-supplied estimator
    pub fn with_estimator(estimator: DensityEstimator, ocr_page_limit: u32) -> Self {
        Self {
            estimator,
            ocr_page_limit,
        }
    }

    /// Derive the full feature record for the PDF at `path`.
    ///
    /// Geometry and rotation cover every page; OCR covers pages
    /// 1..=min(limit, page count). Zero-page documents skip OCR and
    /// report zero words.
    pub fn extract(&self, path: &Path) -> Result<FeatureRecord, ExtractError> {
        let survey = inspect::survey_file(path, None)?;
        let last_page = survey.num_pages.min(u64::from(self.ocr_page_limit)) as u32;
        let average_word_count = self.estimator.average_word_count(path, last_page)?;

        let record = FeatureRecord {
            num_pages: survey.num_pages,
            average_width: survey.average_width,
            average_height: survey.average_height,
            all_pages_rotated: survey.all_pages_rotated,
            average_word_count,
        };
        tracing::debug!("extracted {:?} from {}", record, path.display());
        Ok(record)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}
