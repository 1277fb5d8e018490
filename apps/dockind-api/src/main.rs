//! dockind-api: PDF classification service
//!
//! Upload a PDF, get back a document or powerpoint decision, list the
//! results recorded so far.

mod error;
mod handlers;
mod models;
mod state;
mod store;


use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Uploads above this size are rejected before reaching the handler
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("dockind_api=info".parse()?)
                .add_directive("dockind_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let state = Arc::new(AppState::from_env()?);

    if !dockind_core::ocr_available() {
        tracing::warn!("pdftoppm or tesseract not found on PATH, classification requests will fail");
    }

    let app = router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("dockind-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/classify", post(handlers::classify_pdf))
        .route("/results", get(handlers::list_results))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
