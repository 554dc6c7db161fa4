// Analyze route: classify one text and fan out persistence/archival

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sentira_core::SentimentLabel;

use crate::error::{ApiError, ErrorResponse};
use crate::services::AnalysisService;

// ============================================
// App State and Routes
// ============================================

/// App state for the analyze route
#[derive(Clone)]
pub struct AppState {
    pub service: AnalysisService,
}

impl AppState {
    pub fn new(service: AnalysisService) -> Self {
        Self { service }
    }
}

/// Create analyze routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/analyze", post(analyze))
        .with_state(state)
}

// ============================================
// Request/Response Types
// ============================================

/// Request body for text analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Text to classify, 1 to 5000 characters
    pub text: String,
    /// Archive the raw text and result to object storage. Defaults to true.
    pub archive: Option<bool>,
    /// Caller metadata stored alongside the archived text
    pub metadata: Option<serde_json::Value>,
}

/// Response body for a completed analysis
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Store-assigned record id
    pub id: i64,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    /// Whether the raw text reached the archive (best effort)
    pub archived: bool,
}

// ============================================
// HTTP Handlers
// ============================================

/// POST /v1/analyze - Classify a text and persist the result
#[utoipa::path(
    post,
    path = "/v1/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 201, description = "Text classified and stored", body = AnalyzeResponse),
        (status = 400, description = "Empty or oversized text", body = ErrorResponse),
        (status = 502, description = "Classifier unavailable", body = ErrorResponse),
        (status = 503, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "analyze"
)]
pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), ApiError> {
    let outcome = state
        .service
        .analyze(
            &payload.text,
            payload.archive.unwrap_or(true),
            payload.metadata.as_ref(),
        )
        .await?;

    let record = outcome.record;
    Ok((
        StatusCode::CREATED,
        Json(AnalyzeResponse {
            id: record.id,
            sentiment: record.sentiment,
            confidence: record.confidence,
            timestamp: record.timestamp,
            archived: outcome.archived,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use sentira_core::memory::{FixedClassifier, InMemoryArchive, InMemoryRecordStore};
    use sentira_core::{Classification, TextArchive};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<InMemoryRecordStore>, Arc<InMemoryArchive>) {
        let store = Arc::new(InMemoryRecordStore::new());
        let archive = Arc::new(InMemoryArchive::new());
        let service = AnalysisService::new(
            Arc::new(FixedClassifier::new(Classification {
                sentiment: SentimentLabel::Negative,
                confidence: 0.88,
            })),
            store.clone(),
            archive.clone(),
        );
        (routes(AppState::new(service)), store, archive)
    }

    async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_analyze_returns_created() {
        let (app, store, archive) = test_app();

        let (status, body) = post_json(
            app,
            serde_json::json!({ "text": "guidance cut sharply" }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["sentiment"], "NEGATIVE");
        assert_eq!(body["confidence"], 0.88);
        assert_eq!(body["archived"], true);
        assert_eq!(body["id"], 1);
        assert_eq!(store.len().await, 1);

        // archived means the raw text is actually retrievable
        let raw = archive.list("raw/text/", 10).await.unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(
            archive.get(&raw[0].key).await.unwrap(),
            "guidance cut sharply"
        );
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_text() {
        let (app, store, _archive) = test_app();

        let (status, body) = post_json(app, serde_json::json!({ "text": "  " })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("text cannot be empty"));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_analyze_honors_archive_flag() {
        let (app, _store, archive) = test_app();

        let (status, body) = post_json(
            app,
            serde_json::json!({ "text": "flat session", "archive": false }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["archived"], false);
        assert!(archive.list("", 10).await.unwrap().is_empty());
    }
}
