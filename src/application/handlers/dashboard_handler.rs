use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::services::dashboard_service::{
    DashboardData, DashboardService, SalesSummary, TimeSeriesPoint,
};
use crate::infrastructure::demographics_client::DemographicsClient;

const DASHBOARD_HTML: &str = include_str!("../../../templates/dashboard.html");

/// Handles shared by every request. Built once in `main` after ingestion.
pub struct AppState {
    pub dashboard: DashboardService,
    pub demographics: DemographicsClient,
}

pub type SharedState = Arc<AppState>;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiError {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

pub fn router(state: SharedState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(health_check))
        .route("/api/data", get(get_data))
        .route("/api/time-series", get(get_time_series))
        .route("/api/summary", get(get_summary))
        .route("/api/us-states", get(get_us_states))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Health check endpoint
async fn health_check(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let records = state
        .dashboard
        .record_count()
        .await
        .map_err(|e| internal_error("Health check failed", e))?;

    Ok(Json(serde_json::json!({
        "status": "running",
        "records": records,
    })))
}

/// Combined aggregation payload for the charts
async fn get_data(State(state): State<SharedState>) -> Result<Json<DashboardData>, ApiError> {
    state
        .dashboard
        .dashboard_data()
        .await
        .map(Json)
        .map_err(|e| internal_error("Failed to build dashboard data", e))
}

/// Monthly Total Sales, oldest first
async fn get_time_series(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TimeSeriesPoint>>, ApiError> {
    state
        .dashboard
        .time_series()
        .await
        .map(Json)
        .map_err(|e| internal_error("Failed to build time series", e))
}

async fn get_summary(State(state): State<SharedState>) -> Result<Json<SalesSummary>, ApiError> {
    state
        .dashboard
        .summary()
        .await
        .map(Json)
        .map_err(|e| internal_error("Failed to build summary", e))
}

/// Proxy for the external demographics API
async fn get_us_states(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .demographics
        .fetch()
        .await
        .map(Json)
        .map_err(|e| internal_error("Demographics request failed", e))
}
