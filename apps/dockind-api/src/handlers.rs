//! HTTP handlers

use crate::error::ApiError;
use crate::models::ClassificationResult;
use crate::state::AppState;
use anyhow::Context;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use dockind_core::Category;
use serde_json::json;
use std::sync::Arc;

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Upload extension gate, case-insensitive
pub(crate) fn is_pdf_filename(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// POST /classify
///
/// Accepts a multipart form with a `file` field holding the PDF,
/// classifies it and appends the outcome to the result log.
pub async fn classify_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ClassificationResult>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(|name| name.to_string());
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) = upload.ok_or(ApiError::MissingFile)?;
    // A field with no filename cannot pass the extension gate
    let filename = filename.ok_or(ApiError::InvalidFileFormat)?;
    if !is_pdf_filename(&filename) {
        return Err(ApiError::InvalidFileFormat);
    }

    let classifier = Arc::clone(&state.classifier);
    let category = tokio::task::spawn_blocking(move || -> Result<Category, ApiError> {
        let temp = tempfile::NamedTempFile::new().context("failed to create scratch file")?;
        std::fs::write(temp.path(), &bytes).context("failed to spool upload to disk")?;
        Ok(classifier.classify_file(temp.path())?)
    })
    .await
    .context("classification task failed")??;

    let result = ClassificationResult {
        filename,
        classification: category,
        timestamp: Utc::now(),
    };
    state.store.record(result.clone());
    tracing::info!("classified {} as {}", result.filename, result.classification);

    Ok(Json(result))
}

/// GET /results
pub async fn list_results(State(state): State<Arc<AppState>>) -> Json<Vec<ClassificationResult>> {
    Json(state.store.list_all())
}
