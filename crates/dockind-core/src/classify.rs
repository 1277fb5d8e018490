//! End-to-end PDF classification
//!
//! Bridges feature extraction and the trained model, then folds the
//! model's raw training label into the public two-way [`Category`].

use crate::error::ClassifyError;
use crate::features::FeatureExtractor;
use crate::model::Predictor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Public classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Document,
    Powerpoint,
}

impl Category {
    /// Fold a raw training label into a category. Only the exact label
    /// `documents` maps to [`Category::Document`]; every other label is
    /// treated as slide-like.
    pub fn from_raw_label(label: &str) -> Self {
        if label == "documents" {
            Category::Document
        } else {
            Category::Powerpoint
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Document => "document",
            Category::Powerpoint => "powerpoint",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies a PDF on disk
pub trait Classifier: Send + Sync {
    fn classify_file(&self, path: &Path) -> Result<Category, ClassifyError>;
}

/// Feature extraction plus a trained predictor
pub struct PdfClassifier {
    extractor: FeatureExtractor,
    predictor: Box<dyn Predictor>,
}

impl PdfClassifier {
    pub fn new(extractor: FeatureExtractor, predictor: Box<dyn Predictor>) -> Self {
        Self {
            extractor,
            predictor,
        }
    }
}

impl Classifier for PdfClassifier {
    fn classify_file(&self, path: &Path) -> Result<Category, ClassifyError> {
        let record = self.extractor.extract(path)?;
        let label = self.predictor.predict(&record)?;
        let category = Category::from_raw_label(&label);
        tracing::debug!(
            "classified {} as {} (raw label {})",
            path.display(),
            category,
            label
        );
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{DensityEstimator, PageRasterizer, TextRecognizer};
    use crate::error::{ExtractError, ModelError};
    use crate::features::FeatureRecord;
    use crate::inspect::build_test_pdf;
    use crate::model::LinearModel;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct OnePageRasterizer;

    impl PageRasterizer for OnePageRasterizer {
        fn rasterize(
            &self,
            _pdf: &Path,
            out_dir: &Path,
            _last_page: u32,
        ) -> Result<Vec<PathBuf>, ExtractError> {
            let path = out_dir.join("page-1.png");
            std::fs::write(&path, b"stub")
                .map_err(|e| ExtractError::RenderOrRecognition(e.to_string()))?;
            Ok(vec![path])
        }
    }

    struct FixedTextRecognizer(String);

    impl TextRecognizer for FixedTextRecognizer {
        fn recognize(&self, _image: &Path) -> Result<String, ExtractError> {
            Ok(self.0.clone())
        }
    }

    struct StubPredictor {
        label: &'static str,
        touched: Arc<AtomicBool>,
    }

    impl crate::model::Predictor for StubPredictor {
        fn predict(&self, _record: &FeatureRecord) -> Result<String, ModelError> {
            self.touched.store(true, Ordering::SeqCst);
            Ok(self.label.to_string())
        }
    }

    fn stub_extractor(page_text: &str) -> FeatureExtractor {
        let estimator = DensityEstimator::new(
            Box::new(OnePageRasterizer),
            Box::new(FixedTextRecognizer(page_text.to_string())),
        );
        FeatureExtractor::with_estimator(estimator, 10)
    }

    fn classifier_with_label(label: &'static str) -> (PdfClassifier, Arc<AtomicBool>) {
        let touched = Arc::new(AtomicBool::new(false));
        let predictor = StubPredictor {
            label,
            touched: Arc::clone(&touched),
        };
        let classifier = PdfClassifier::new(stub_extractor("some page text"), Box::new(predictor));
        (classifier, touched)
    }

    fn write_temp_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), bytes).unwrap();
        file
    }

    const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

    #[test]
    fn test_documents_label_maps_to_document() {
        let pdf = write_temp_pdf(&build_test_pdf(&[(Some(LETTER), None)]));
        let (classifier, _) = classifier_with_label("documents");
        assert_eq!(
            classifier.classify_file(pdf.path()).unwrap(),
            Category::Document
        );
    }

    #[test]
    fn test_other_labels_map_to_powerpoint() {
        let pdf = write_temp_pdf(&build_test_pdf(&[(Some(LETTER), None)]));
        for label in ["powerpoints", "slides", "document", ""] {
            let (classifier, _) = classifier_with_label(label);
            assert_eq!(
                classifier.classify_file(pdf.path()).unwrap(),
                Category::Powerpoint,
                "label {:?} should fold to powerpoint",
                label
            );
        }
    }

    #[test]
    fn test_extract_failure_skips_prediction() {
        let pdf = write_temp_pdf(b"not a pdf at all");
        let (classifier, touched) = classifier_with_label("documents");

        let result = classifier.classify_file(pdf.path());
        assert!(matches!(
            result,
            Err(ClassifyError::FeatureExtractionFailed(_))
        ));
        assert!(!touched.load(Ordering::SeqCst));
    }

    #[test]
    fn test_linear_model_end_to_end() {
        // Wide sparse page drives the decision score positive
        let pdf = write_temp_pdf(&build_test_pdf(&[(Some([0.0, 0.0, 960.0, 540.0]), None)]));
        let model = LinearModel {
            classes: vec!["documents".to_string(), "powerpoints".to_string()],
            feature_names: vec![
                "average_width".to_string(),
                "average_height".to_string(),
                "all_pages_rotated".to_string(),
                "average_word_count".to_string(),
            ],
            coefficients: vec![vec![0.02, -0.02, 0.8, -0.015]],
            intercepts: vec![0.5],
        };
        let classifier = PdfClassifier::new(
            stub_extractor("forty words of slide copy"),
            Box::new(model),
        );

        assert_eq!(
            classifier.classify_file(pdf.path()).unwrap(),
            Category::Powerpoint
        );
    }

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Category::Document).unwrap(),
            serde_json::json!("document")
        );
        assert_eq!(
            serde_json::to_value(Category::Powerpoint).unwrap(),
            serde_json::json!("powerpoint")
        );
    }

    #[test]
    fn test_category_display_matches_wire_form() {
        assert_eq!(Category::Document.to_string(), "document");
        assert_eq!(Category::Powerpoint.to_string(), "powerpoint");
    }
}
