// Sentira API server
// Decision: archive writes are best effort; classification and persistence are not
// Decision: the server starts even when a dependency probe fails, and reports
// the outage through /v1/health instead

mod analyze;
mod archive;
mod error;
mod health;
mod sentiment;
mod services;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sentira_aws::{AwsConfig, ComprehendClassifier, S3Archive};
use sentira_core::{
    Aggregator, ArchiveObject, DailyTrend, LabelCount, LabelSummary, RecordStore,
    SentimentClassifier, SentimentLabel, SentimentRecord, TextArchive,
};
use sentira_storage::{Database, DbRecordStore};

use crate::services::AnalysisService;

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness probe; does not touch any dependency
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    docs: &'static str,
    health: &'static str,
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "sentira-api",
        version: env!("CARGO_PKG_VERSION"),
        description: "Market sentiment analysis over a managed classifier, PostgreSQL, and object storage",
        docs: "/swagger-ui",
        health: "/v1/health",
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        analyze::analyze,
        sentiment::today_summary,
        sentiment::daily_summary,
        sentiment::trend,
        sentiment::history,
        archive::list_objects,
        health::health,
    ),
    components(
        schemas(
            SentimentLabel, SentimentRecord,
            LabelSummary, LabelCount, DailyTrend,
            ArchiveObject,
            analyze::AnalyzeRequest,
            analyze::AnalyzeResponse,
            sentiment::DailySummaryResponse,
            sentiment::TrendResponse,
            sentiment::HistoryResponse,
            archive::ListObjectsResponse,
            health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "analyze", description = "Text classification endpoints"),
        (name = "sentiment", description = "Aggregated sentiment read endpoints"),
        (name = "archive", description = "Archived object browsing endpoints"),
        (name = "health", description = "Dependency health endpoints")
    ),
    info(
        title = "Sentira API",
        version = "0.1.0",
        description = "REST API for market sentiment classification, persistence, and aggregation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentira_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("sentira-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Connected to database");

    // Initialize AWS-backed classifier and archive
    let aws_config = AwsConfig::from_env().context("Failed to load AWS configuration")?;
    let bucket = std::env::var("S3_BUCKET_NAME")
        .context("S3_BUCKET_NAME environment variable required")?;
    let mut classifier = ComprehendClassifier::new(&aws_config)
        .context("Failed to build sentiment classifier")?;
    if let Ok(language_code) = std::env::var("COMPREHEND_LANGUAGE_CODE") {
        classifier = classifier.with_language_code(language_code);
    }
    let s3 = S3Archive::new(&aws_config, bucket).context("Failed to build archive client")?;

    // Shared backends behind the core traits
    let store: Arc<dyn RecordStore> = Arc::new(DbRecordStore::new(db));
    let classifier: Arc<dyn SentimentClassifier> = Arc::new(classifier);
    let archive: Arc<dyn TextArchive> = Arc::new(s3);

    // Startup probes; outages are reported, not fatal
    match store.ping().await {
        Ok(()) => tracing::info!("Database connection: OK"),
        Err(e) => tracing::warn!("Database connection: FAILED ({})", e),
    }
    match archive.ping().await {
        Ok(()) => tracing::info!("Archive connection: OK"),
        Err(e) => tracing::warn!("Archive connection: FAILED ({})", e),
    }

    // Create module-specific states
    let analyze_state = analyze::AppState::new(AnalysisService::new(
        classifier,
        store.clone(),
        archive.clone(),
    ));
    let sentiment_state = sentiment::AppState::new(Aggregator::new(store.clone()));
    let archive_state = archive::AppState::new(archive.clone());
    let health_state = health::AppState::new(store, archive);

    // Load API prefix from environment (default: empty)
    // Example: API_PREFIX="/api" results in routes like /api/v1/analyze
    let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();
    if !api_prefix.is_empty() {
        tracing::info!(prefix = %api_prefix, "API prefix configured");
    }

    // Load CORS allowed origins from environment (optional)
    // Example: CORS_ALLOWED_ORIGINS="https://dash.example.com,https://admin.example.com"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build API routes
    let api_routes = Router::new()
        .merge(analyze::routes(analyze_state))
        .merge(sentiment::routes(sentiment_state))
        .merge(archive::routes(archive_state))
        .merge(health::routes(health_state));

    // Build main router with the info and liveness routes left unprefixed
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(liveness));

    // Apply API prefix if configured
    app = app.merge(build_router_with_prefix(api_routes, &api_prefix));

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    tracing::info!("Startup completed");

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
