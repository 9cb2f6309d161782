//! HTTP error type.
//!
//! Every failure is returned as `{"detail": message}` with a matching status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use insightlens::InsightError;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Upload not found: {0}")]
    UploadNotFound(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Insight(#[from] InsightError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UploadNotFound(_) | ApiError::ReportNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Insight(err) => match err.error_code() {
                "MAX_ROWS_EXCEEDED" => StatusCode::PAYLOAD_TOO_LARGE,
                "INVALID_CONFIG" => StatusCode::BAD_REQUEST,
                _ if err.is_ingestion_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "detail": self.to_string()
        }));

        (status, body).into_response()
    }
}
