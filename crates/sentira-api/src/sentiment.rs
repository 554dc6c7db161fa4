// Sentiment read routes: daily summaries, trend windows, history
//
// All aggregation happens in sentira-core; handlers only translate query
// parameters and re-shape results for the wire. Day boundaries are UTC.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use sentira_core::{
    Aggregator, DailyTrend, LabelSummary, SentimentError, SentimentLabel, SentimentRecord,
};

use crate::error::{ApiError, ErrorResponse};

/// Longest permitted history window, in days
const MAX_HISTORY_DAYS: i64 = 365;

/// Trend window used when the caller does not pick one
const DEFAULT_WINDOW_DAYS: i64 = 7;

// ============================================
// App State and Routes
// ============================================

/// App state for sentiment read routes
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }
}

/// Create sentiment read routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/sentiment/today", get(today_summary))
        .route("/v1/sentiment/daily", get(daily_summary))
        .route("/v1/sentiment/trend", get(trend))
        .route("/v1/sentiment/history", get(history))
        .with_state(state)
}

// ============================================
// Query Parameters
// ============================================

/// Query parameters for a single-day summary
#[derive(Debug, Deserialize, IntoParams)]
pub struct DailyQuery {
    /// UTC calendar date to summarize. Defaults to today.
    #[param(example = "2026-03-14")]
    pub date: Option<NaiveDate>,
}

/// Query parameters for the trend window
#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendQuery {
    /// Trailing window length in days, ending today. Defaults to 7.
    #[param(example = 7)]
    pub window_days: Option<i64>,
}

/// Query parameters for history reads
#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Trailing window length in days, ending today. Defaults to 7, at most 365.
    #[param(example = 7)]
    pub days: Option<i64>,
}

// ============================================
// Response Types
// ============================================

/// Per-label averages for one UTC date
#[derive(Debug, Serialize, ToSchema)]
pub struct DailySummaryResponse {
    pub date: NaiveDate,
    /// Labels with no records that day are omitted
    pub summary: BTreeMap<SentimentLabel, LabelSummary>,
}

/// Per-day label counts over a trailing window
#[derive(Debug, Serialize, ToSchema)]
pub struct TrendResponse {
    pub window_days: i64,
    /// Oldest day first; every day in the window is present
    pub days: Vec<DailyTrend>,
}

/// Raw records over a trailing window
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub days: i64,
    pub count: usize,
    /// Oldest record first
    pub records: Vec<SentimentRecord>,
}

// ============================================
// HTTP Handlers
// ============================================

/// GET /v1/sentiment/today - Summary for the current UTC date
#[utoipa::path(
    get,
    path = "/v1/sentiment/today",
    responses(
        (status = 200, description = "Per-label summary for today", body = DailySummaryResponse),
        (status = 503, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn today_summary(
    State(state): State<AppState>,
) -> Result<Json<DailySummaryResponse>, ApiError> {
    let date = Utc::now().date_naive();
    let summary = state.aggregator.daily_summary(date).await?;
    Ok(Json(DailySummaryResponse { date, summary }))
}

/// GET /v1/sentiment/daily - Summary for one UTC date
#[utoipa::path(
    get,
    path = "/v1/sentiment/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "Per-label summary for the date", body = DailySummaryResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 503, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn daily_summary(
    State(state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailySummaryResponse>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.aggregator.daily_summary(date).await?;
    Ok(Json(DailySummaryResponse { date, summary }))
}

/// GET /v1/sentiment/trend - Per-day label counts over a trailing window
#[utoipa::path(
    get,
    path = "/v1/sentiment/trend",
    params(TrendQuery),
    responses(
        (status = 200, description = "Day-by-day label counts", body = TrendResponse),
        (status = 400, description = "Non-positive window", body = ErrorResponse),
        (status = 503, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn trend(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendResponse>, ApiError> {
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let days = state.aggregator.trend(window_days).await?;
    Ok(Json(TrendResponse { window_days, days }))
}

/// GET /v1/sentiment/history - Raw records over a trailing window
#[utoipa::path(
    get,
    path = "/v1/sentiment/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Records, oldest first", body = HistoryResponse),
        (status = 400, description = "Window out of range", body = ErrorResponse),
        (status = 503, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days > MAX_HISTORY_DAYS {
        return Err(SentimentError::invalid_argument(format!(
            "days must be at most {MAX_HISTORY_DAYS}, got {days}"
        ))
        .into());
    }

    let records = state.aggregator.history(days).await?;
    Ok(Json(HistoryResponse {
        days,
        count: records.len(),
        records,
    }))
}
