//! OCR-based text density estimation
//!
//! Renders the leading pages of a PDF to PNG images and recognizes the
//! text on each one, shelling out to `pdftoppm` (poppler-utils) and
//! `tesseract` the same way the desktop tools do. Both stages sit behind
//! traits so callers can swap in stubs.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Render resolution handed to the rasterizer when none is configured
pub const DEFAULT_DPI: u32 = 200;

/// Recognition language used when none is configured
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Renders a leading page range of a PDF into per-page images
pub trait PageRasterizer: Send + Sync {
    /// Render pages 1..=`last_page` into `out_dir`, returning one image
    /// per page in page order
    fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        last_page: u32,
    ) -> Result<Vec<PathBuf>, ExtractError>;
}

/// Recognizes the text in a rendered page image
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<String, ExtractError>;
}

/// Check that the rasterize and recognition tools are on PATH
pub fn ocr_available() -> bool {
    let pdftoppm = Command::new("pdftoppm").arg("-v").output().is_ok();
    let tesseract = Command::new("tesseract").arg("--version").output().is_ok();

    if !pdftoppm {
        tracing::debug!("pdftoppm not found, install poppler-utils");
    }
    if !tesseract {
        tracing::debug!("tesseract not found, install tesseract-ocr");
    }

    pdftoppm && tesseract
}

/// `pdftoppm`-backed rasterizer
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    dpi: u32,
}

impl PopplerRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        last_page: u32,
    ) -> Result<Vec<PathBuf>, ExtractError> {
        let prefix = out_dir.join("page");

        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg(last_page.to_string())
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                ExtractError::RenderOrRecognition(format!("failed to run pdftoppm: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::RenderOrRecognition(format!(
                "pdftoppm failed: {}",
                stderr.trim()
            )));
        }

        // pdftoppm names output <prefix>-<page>.png, zero-padded, so a
        // lexicographic sort restores page order
        let mut images: Vec<PathBuf> = std::fs::read_dir(out_dir)
            .map_err(|e| {
                ExtractError::RenderOrRecognition(format!("failed to list rendered pages: {}", e))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(ExtractError::RenderOrRecognition(
                "pdftoppm produced no images".to_string(),
            ));
        }

        Ok(images)
    }
}

/// `tesseract`-backed recognizer
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
}

impl TesseractRecognizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_LANGUAGE)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &Path) -> Result<String, ExtractError> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg("1")
            .output()
            .map_err(|e| {
                ExtractError::RenderOrRecognition(format!("failed to run tesseract: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::RenderOrRecognition(format!(
                "tesseract failed on {}: {}",
                image.display(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Word-count estimator over a rendered page prefix
pub struct DensityEstimator {
    rasterizer: Box<dyn PageRasterizer>,
    recognizer: Box<dyn TextRecognizer>,
}

impl DensityEstimator {
    pub fn new(rasterizer: Box<dyn PageRasterizer>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            rasterizer,
            recognizer,
        }
    }

    /// Mean whitespace-separated word count over pages 1..=`last_page`,
    /// truncated toward zero. A `last_page` of zero skips rendering
    /// entirely and reports zero words.
    pub fn average_word_count(&self, pdf: &Path, last_page: u32) -> Result<i64, ExtractError> {
        if last_page == 0 {
            return Ok(0);
        }

        let scratch = tempfile::tempdir().map_err(|e| {
            ExtractError::RenderOrRecognition(format!("failed to create scratch directory: {}", e))
        })?;

        let images = self.rasterizer.rasterize(pdf, scratch.path(), last_page)?;
        tracing::debug!("rendered {} pages from {}", images.len(), pdf.display());

        let mut total_words = 0usize;
        for image in &images {
            let text = self.recognizer.recognize(image)?;
            total_words += text.split_whitespace().count();
        }

        tracing::debug!(
            "recognized {} words across {} pages of {}",
            total_words,
            images.len(),
            pdf.display()
        );

        Ok((total_words as f64 / images.len() as f64) as i64)
    }
}

impl Default for DensityEstimator {
    fn default() -> Self {
        Self::new(
            Box::new(PopplerRasterizer::default()),
            Box::new(TesseractRecognizer::default()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubRasterizer {
        pages: usize,
    }

    impl PageRasterizer for StubRasterizer {
        fn rasterize(
            &self,
            _pdf: &Path,
            out_dir: &Path,
            _last_page: u32,
        ) -> Result<Vec<PathBuf>, ExtractError> {
            (1..=self.pages)
                .map(|n| {
                    let path = out_dir.join(format!("page-{}.png", n));
                    std::fs::write(&path, b"stub").map_err(|e| {
                        ExtractError::RenderOrRecognition(e.to_string())
                    })?;
                    Ok(path)
                })
                .collect()
        }
    }

    struct FailingRasterizer;

    impl PageRasterizer for FailingRasterizer {
        fn rasterize(
            &self,
            _pdf: &Path,
            _out_dir: &Path,
            _last_page: u32,
        ) -> Result<Vec<PathBuf>, ExtractError> {
            Err(ExtractError::RenderOrRecognition(
                "rasterizer should not have been invoked".to_string(),
            ))
        }
    }

    // Returns one canned text per call, in order
    struct ScriptedRecognizer {
        texts: Vec<&'static str>,
        calls: Mutex<usize>,
    }

    impl ScriptedRecognizer {
        fn new(texts: Vec<&'static str>) -> Self {
            Self {
                texts,
                calls: Mutex::new(0),
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(&self, _image: &Path) -> Result<String, ExtractError> {
            let mut calls = self.calls.lock().unwrap();
            let text = self.texts[*calls % self.texts.len()];
            *calls += 1;
            Ok(text.to_string())
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(&self, _image: &Path) -> Result<String, ExtractError> {
            Err(ExtractError::RenderOrRecognition("no text layer".to_string()))
        }
    }

    fn estimator(
        rasterizer: impl PageRasterizer + 'static,
        recognizer: impl TextRecognizer + 'static,
    ) -> DensityEstimator {
        DensityEstimator::new(Box::new(rasterizer), Box::new(recognizer))
    }

    #[test]
    fn test_average_word_count_truncates() {
        let est = estimator(
            StubRasterizer { pages: 2 },
            ScriptedRecognizer::new(vec!["one two three", "four five six seven"]),
        );
        // 7 words over 2 pages truncates to 3
        let words = est.average_word_count(Path::new("whatever.pdf"), 2).unwrap();
        assert_eq!(words, 3);
    }

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        let est = estimator(
            StubRasterizer { pages: 1 },
            ScriptedRecognizer::new(vec!["Quarterly  Report\n\tSummary\n"]),
        );
        let words = est.average_word_count(Path::new("whatever.pdf"), 1).unwrap();
        assert_eq!(words, 3);
    }

    #[test]
    fn test_empty_page_counts_zero_words() {
        let est = estimator(StubRasterizer { pages: 1 }, ScriptedRecognizer::new(vec![""]));
        let words = est.average_word_count(Path::new("whatever.pdf"), 1).unwrap();
        assert_eq!(words, 0);
    }

    #[test]
    fn test_zero_last_page_skips_rendering() {
        let est = estimator(FailingRasterizer, FailingRecognizer);
        let words = est.average_word_count(Path::new("whatever.pdf"), 0).unwrap();
        assert_eq!(words, 0);
    }

    #[test]
    fn test_render_failure_propagates() {
        let est = estimator(FailingRasterizer, ScriptedRecognizer::new(vec!["text"]));
        let result = est.average_word_count(Path::new("whatever.pdf"), 1);
        assert!(matches!(
            result,
            Err(ExtractError::RenderOrRecognition(_))
        ));
    }

    #[test]
    fn test_recognition_failure_propagates() {
        let est = estimator(StubRasterizer { pages: 1 }, FailingRecognizer);
        let result = est.average_word_count(Path::new("whatever.pdf"), 1);
        assert!(matches!(
            result,
            Err(ExtractError::RenderOrRecognition(_))
        ));
    }
}
