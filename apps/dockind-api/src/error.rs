//! API error taxonomy and HTTP status mapping

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dockind_core::ClassifyError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid file format. Only PDF files are allowed.")]
    InvalidFileFormat,

    #[error("Upload is missing a \"file\" field")]
    MissingFile,

    #[error("Malformed upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassifyError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidFileFormat | ApiError::MissingFile => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ApiError::Upload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Classification(e) => {
                tracing::error!("classification failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred while processing the file.".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred while processing the file.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
