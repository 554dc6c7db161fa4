// Composite health route
//
// Reports each dependency separately so a degraded archive does not read as
// a dead service. Always answers 200; the body carries the verdict.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use sentira_core::{RecordStore, TextArchive};

// ============================================
// App State and Routes
// ============================================

/// App state for the health route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub archive: Arc<dyn TextArchive>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, archive: Arc<dyn TextArchive>) -> Self {
        Self { store, archive }
    }
}

/// Create health routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .with_state(state)
}

// ============================================
// Response Types
// ============================================

/// Response body for the composite health check
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" when both dependencies respond, "degraded" when one is
    /// down, "unhealthy" when both are
    pub status: String,
    pub database: bool,
    pub archive: bool,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================
// HTTP Handlers
// ============================================

/// GET /v1/health - Probe the record store and the archive
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Dependency health report", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db_probe, archive_probe) = tokio::join!(state.store.ping(), state.archive.ping());

    let database = match db_probe {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("record store health check failed: {}", e);
            false
        }
    };
    let archive = match archive_probe {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("archive health check failed: {}", e);
            false
        }
    };

    let status = match (database, archive) {
        (true, true) => "healthy",
        (false, false) => "unhealthy",
        _ => "degraded",
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        archive,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
