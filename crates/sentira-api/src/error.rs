// HTTP mapping for sentiment pipeline errors
//
// Every failing handler returns the same `{"error": ...}` body. Status codes
// follow the error taxonomy:
// - InvalidArgument  -> 400 (caller mistake, rejected before any I/O)
// - Classifier       -> 502 (managed classifier call failed)
// - Archive          -> 502 (object store call failed)
// - DataUnavailable  -> 503 (record store unreachable or query failed)
// - Internal         -> 500 (body stays generic, detail goes to the log)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use sentira_core::SentimentError;

/// JSON error body returned by every failing handler
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper that lets handlers bubble pipeline errors with `?`
#[derive(Debug)]
pub struct ApiError(SentimentError);

impl From<SentimentError> for ApiError {
    fn from(err: SentimentError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            SentimentError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SentimentError::Classifier(_) | SentimentError::Archive(_) => StatusCode::BAD_GATEWAY,
            SentimentError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SentimentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }

        // Internal detail never reaches the response body
        let error = match &self.0 {
            SentimentError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
