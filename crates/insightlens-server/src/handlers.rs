//! HTTP request handlers
//!
//! Axum handlers for upload, analysis and report retrieval.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use insightlens::{
    AnalysisConfig, AnalysisSummary, DataQualityAnalyzer, IngestOptions, InsightError,
    InsightResult, ReportFormat, ReportGenerator, read_table_from_bytes,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::{AppState, StoredReport, StoredUpload};

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub upload_id: String,
    pub filename: String,
}

/// Body of `POST /analyze`. Thresholds not given fall back to defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub upload_id: String,
    #[serde(flatten)]
    pub config: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub report_id: String,
    pub summary: AnalysisSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Health check handler
pub async fn status() -> &'static str {
    "InsightLens API OK"
}

/// Store the multipart field `file` and hand back its upload id.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ApiError::BadRequest("No file uploaded".to_string())),
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        info!(file = %filename, bytes = bytes.len(), "Upload received");
        let upload_id = state.uploads.insert(filename.clone(), bytes);
        return Ok(Json(UploadResponse {
            upload_id,
            filename,
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// Run the full analysis on a stored upload and keep the result.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let upload = state
        .uploads
        .get(&request.upload_id)
        .ok_or_else(|| ApiError::UploadNotFound(request.upload_id.clone()))?;
    request.config.validate().map_err(InsightError::from)?;

    let options = IngestOptions::default().with_max_rows(state.config.max_rows);
    let config = request.config;

    let report = tokio::task::spawn_blocking(move || run_analysis(&upload, &options, &config))
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis task failed: {e}")))??;

    let summary = report.summary.clone();
    let report_id = state.reports.insert(report);
    info!(
        report_id = %report_id,
        upload_id = %request.upload_id,
        "Analysis stored"
    );

    Ok(Json(AnalyzeResponse { report_id, summary }))
}

/// Return a stored report as HTML (default) or as the JSON summary.
pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let report = state
        .reports
        .get(&report_id)
        .ok_or(ApiError::ReportNotFound(report_id))?;

    let response = match query.format {
        ReportFormat::Html => Html(report.html.clone()).into_response(),
        ReportFormat::Json => Json(&report.summary).into_response(),
    };
    Ok(response)
}

fn run_analysis(
    upload: &StoredUpload,
    options: &IngestOptions,
    config: &AnalysisConfig,
) -> InsightResult<StoredReport> {
    let df = read_table_from_bytes(&upload.bytes, &upload.filename, options)?;
    let summary = DataQualityAnalyzer::analyze(&df, config)?;
    let html = ReportGenerator::render_html_report(&summary);
    Ok(StoredReport { summary, html })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::{Body, to_bytes};
    use axum::extract::FromRequest;
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;

    const SAMPLE_CSV: &str = "id,city\n1,Paris\n2,Rome\n2,Rome\n4,\n";

    fn test_state() -> AppState {
        AppState::new(ServerConfig::default())
    }

    async fn multipart_body(filename: Option<&str>, content: &str) -> Multipart {
        let boundary = "insightlens-test-boundary";
        let disposition = match filename {
            Some(name) => format!("form-data; name=\"file\"; filename=\"{name}\""),
            None => "form-data; name=\"file\"".to_string(),
        };
        let body = format!(
            "--{boundary}\r\nContent-Disposition: {disposition}\r\n\
             Content-Type: text/csv\r\n\r\n{content}\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn analyze_request(upload_id: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            upload_id: upload_id.to_string(),
            config: AnalysisConfig::default(),
        }
    }

    async fn upload_sample(state: &AppState, filename: &str, content: &str) -> String {
        let multipart = multipart_body(Some(filename), content).await;
        match upload(State(state.clone()), multipart).await {
            Ok(Json(body)) => body.upload_id,
            Err(err) => panic!("upload failed: {err}"),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_status() {
        assert_eq!(status().await, "InsightLens API OK");
    }

    #[tokio::test]
    async fn test_upload_stores_file() {
        let state = test_state();
        let multipart = multipart_body(Some("cities.csv"), SAMPLE_CSV).await;

        let Ok(Json(body)) = upload(State(state.clone()), multipart).await else {
            panic!("expected upload to succeed");
        };
        assert_eq!(body.filename, "cities.csv");
        assert_eq!(body.upload_id.len(), 32);

        let stored = state.uploads.get(&body.upload_id).unwrap();
        assert_eq!(&stored.bytes[..], SAMPLE_CSV.as_bytes());
    }

    #[tokio::test]
    async fn test_upload_without_filename() {
        let state = test_state();
        let multipart = multipart_body(None, SAMPLE_CSV).await;

        let Err(err) = upload(State(state.clone()), multipart).await else {
            panic!("expected upload to fail");
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(state.uploads.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_and_fetch_report() {
        let state = test_state();
        let upload_id = upload_sample(&state, "cities.csv", SAMPLE_CSV).await;

        let Ok(Json(body)) = analyze(State(state.clone()), Json(analyze_request(&upload_id))).await
        else {
            panic!("expected analysis to succeed");
        };
        assert_eq!(body.summary.n_rows, 4);
        assert_eq!(body.summary.n_columns, 2);
        assert_eq!(body.summary.duplicate_count, 2);
        assert_eq!(body.summary.missingness["city"], 1);

        let Ok(html) = get_report(
            State(state.clone()),
            Path(body.report_id.clone()),
            Query(ReportQuery::default()),
        )
        .await
        else {
            panic!("expected html report");
        };
        assert_eq!(html.status(), StatusCode::OK);
        let html = body_string(html).await;
        assert!(html.contains("<h2>Summary</h2>"));
        assert!(html.contains("Rows: 4 | Columns: 2"));

        let Ok(json) = get_report(
            State(state.clone()),
            Path(body.report_id.clone()),
            Query(ReportQuery {
                format: ReportFormat::Json,
            }),
        )
        .await
        else {
            panic!("expected json report");
        };
        let value: serde_json::Value = serde_json::from_str(&body_string(json).await).unwrap();
        assert_eq!(value["n_rows"], 4);
        assert_eq!(value["duplicate_sample_indices"], serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn test_analyze_unknown_upload() {
        let state = test_state();

        let Err(err) = analyze(State(state), Json(analyze_request("nonexistent"))).await else {
            panic!("expected analysis to fail");
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_invalid_thresholds() {
        let state = test_state();
        let upload_id = upload_sample(&state, "cities.csv", SAMPLE_CSV).await;
        let mut request = analyze_request(&upload_id);
        request.config.outlier_multiplier = 0.0;

        let Err(err) = analyze(State(state.clone()), Json(request)).await else {
            panic!("expected analysis to fail");
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(state.reports.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_unsupported_extension() {
        let state = test_state();
        let upload_id = upload_sample(&state, "data.json", "{}").await;

        let Err(err) = analyze(State(state), Json(analyze_request(&upload_id))).await else {
            panic!("expected analysis to fail");
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_row_limit() {
        let state = AppState::new(ServerConfig {
            max_rows: 2,
            ..ServerConfig::default()
        });
        let upload_id = upload_sample(&state, "cities.csv", SAMPLE_CSV).await;

        let Err(err) = analyze(State(state), Json(analyze_request(&upload_id))).await else {
            panic!("expected analysis to fail");
        };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_report_not_found() {
        let state = test_state();

        let Err(err) = get_report(
            State(state),
            Path("nonexistent".to_string()),
            Query(ReportQuery::default()),
        )
        .await
        else {
            panic!("expected lookup to fail");
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_analyze_request_defaults() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"upload_id": "abc", "outlier_multiplier": 3.0}"#).unwrap();
        assert_eq!(request.upload_id, "abc");
        assert_eq!(request.config.outlier_multiplier, 3.0);
        assert_eq!(request.config.missingness_threshold, 0.5);
        assert_eq!(request.config.max_duplicate_samples, 10);
    }
}
