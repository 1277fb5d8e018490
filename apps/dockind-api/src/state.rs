//! Shared application state

use crate::store::{MemoryResultStore, ResultStore};
use anyhow::Context;
use dockind_core::{Classifier, ExtractOptions, FeatureExtractor, LinearModel, PdfClassifier};
use std::path::Path;
use std::sync::Arc;

/// Model artifact location when MODEL_PATH is unset
const DEFAULT_MODEL_PATH: &str = "models/logistic_regression.json";

pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub store: Arc<dyn ResultStore>,
}

impl AppState {
    /// Assemble production state from the environment.
    ///
    /// Honors MODEL_PATH, DOCKIND_PAGES, DOCKIND_DPI and
    /// DOCKIND_OCR_LANG; extraction defaults apply for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let model_path =
            std::env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        let model = LinearModel::from_path(Path::new(&model_path))
            .with_context(|| format!("failed to load model artifact from {}", model_path))?;

        let mut options = ExtractOptions::default();
        if let Some(limit) = env_parse("DOCKIND_PAGES") {
            options.ocr_page_limit = limit;
        }
        if let Some(dpi) = env_parse("DOCKIND_DPI") {
            options.dpi = dpi;
        }
        if let Ok(language) = std::env::var("DOCKIND_OCR_LANG") {
            options.ocr_language = language;
        }

        let classifier = PdfClassifier::new(FeatureExtractor::new(options), Box::new(model));
        Ok(Self::with_parts(
            Arc::new(classifier),
            Arc::new(MemoryResultStore::default()),
        ))
    }

    pub fn with_parts(classifier: Arc<dyn Classifier>, store: Arc<dyn ResultStore>) -> Self {
        Self { classifier, store }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
