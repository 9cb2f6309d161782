//! InsightLens HTTP service
//!
//! Thin axum layer over the `insightlens` engine:
//!
//! - `POST /upload` stores a multipart `file` field and returns an upload id
//! - `POST /analyze` runs the full analysis on an upload and stores the report
//! - `GET /report/{id}?format=html|json` returns a stored report
//! - `GET /status` is a liveness check
//!
//! Uploads and reports are kept in memory only.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::{AppState, ReportStore, UploadStore};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/analyze", post(handlers::analyze))
        .route("/report/:report_id", get(handlers::get_report))
        .route("/status", get(handlers::status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
