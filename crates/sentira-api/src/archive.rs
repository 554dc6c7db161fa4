// Archive routes: browse objects written by the analyze pipeline

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use sentira_core::{ArchiveObject, SentimentError, TextArchive};

use crate::error::{ApiError, ErrorResponse};

/// Largest permitted page size for listings
const MAX_LIST_LIMIT: usize = 100;

/// Page size used when the caller does not pick one
const DEFAULT_LIST_LIMIT: usize = 10;

// ============================================
// App State and Routes
// ============================================

/// App state for archive routes
#[derive(Clone)]
pub struct AppState {
    pub archive: Arc<dyn TextArchive>,
}

impl AppState {
    pub fn new(archive: Arc<dyn TextArchive>) -> Self {
        Self { archive }
    }
}

/// Create archive routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/archive/objects", get(list_objects))
        .with_state(state)
}

// ============================================
// Query Parameters and Response Types
// ============================================

/// Query parameters for archive listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListObjectsQuery {
    /// Key prefix filter. Raw texts live under "raw/text/", results under
    /// "processed/sentiment/". Defaults to no filter.
    pub prefix: Option<String>,
    /// Maximum number of objects to return. Defaults to 10, at most 100.
    #[param(example = 10)]
    pub limit: Option<usize>,
}

/// Response body for archive listings
#[derive(Debug, Serialize, ToSchema)]
pub struct ListObjectsResponse {
    pub prefix: String,
    pub limit: usize,
    pub count: usize,
    pub objects: Vec<ArchiveObject>,
}

// ============================================
// HTTP Handlers
// ============================================

/// GET /v1/archive/objects - List archived objects under a prefix
#[utoipa::path(
    get,
    path = "/v1/archive/objects",
    params(ListObjectsQuery),
    responses(
        (status = 200, description = "Objects under the prefix", body = ListObjectsResponse),
        (status = 400, description = "Limit out of range", body = ErrorResponse),
        (status = 502, description = "Archive unavailable", body = ErrorResponse)
    ),
    tag = "archive"
)]
pub async fn list_objects(
    State(state): State<AppState>,
    Query(query): Query<ListObjectsQuery>,
) -> Result<Json<ListObjectsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(SentimentError::invalid_argument(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}, got {limit}"
        ))
        .into());
    }

    let prefix = query.prefix.unwrap_or_default();
    let objects = state.archive.list(&prefix, limit).await?;
    Ok(Json(ListObjectsResponse {
        prefix,
        limit,
        count: objects.len(),
        objects,
    }))
}
