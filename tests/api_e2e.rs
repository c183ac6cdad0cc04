//! HTTP API End-to-End Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`. Local TCP
//! listeners stand in for the external demographics API.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sales_dashboard::application::handlers::dashboard_handler::{router, AppState};
use sales_dashboard::application::services::dashboard_service::DashboardService;
use sales_dashboard::application::services::ingestion_service::IngestionService;
use sales_dashboard::infrastructure::demographics_client::DemographicsClient;
use sales_dashboard::infrastructure::spreadsheet_reader::SpreadsheetReader;
use sales_dashboard::persistence::{self, repository::SalesRepository, DbPool};
use serde_json::Value;
use tower::ServiceExt;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Listener that accepts connections and never answers.
async fn hanging_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    format!("http://{}/states", addr)
}

async fn json_endpoint(body: Value) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/states",
        axum::routing::get(move || {
            let body = body.clone();
            async move { axum::Json(body) }
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/states", addr)
}

async fn ingested_pool(dir: &Path) -> DbPool {
    let store = dir.join("sales.db");
    IngestionService::new(SpreadsheetReader::default(), fixture("sales.xlsx"), &store)
        .run()
        .await
        .unwrap();
    persistence::open_read_only(&store, 2).await.unwrap()
}

fn app(pool: DbPool, demographics_url: String, static_dir: &Path) -> Router {
    let demographics =
        DemographicsClient::new(demographics_url, Some(Duration::from_millis(200))).unwrap();
    let state = Arc::new(AppState {
        dashboard: DashboardService::new(SalesRepository::new(pool)),
        demographics,
    });
    router(state, static_dir)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(app, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_api_data_payload() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ingested_pool(dir.path()).await, hanging_endpoint().await, dir.path());

    let (status, body) = get_json(&app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["retailer_counts"]["Foot Locker"], 2);
    assert_eq!(body["retailer_counts"]["Walmart"], 2);
    assert_eq!(body["metrics"]["Total Sales"]["Foot Locker"], 604000.0);
    assert_eq!(body["metrics"]["Units Sold"]["Walmart"], 750.0);
    assert_eq!(body["metrics"]["Operating Profit"]["Foot Locker"], 301000.0);
    assert_eq!(body["product_sales"]["Women's Apparel"], 9000.0);
    assert_eq!(body["region_data"]["Northeast"], 604000.0);
    assert_eq!(body["state_data"]["Florida"], 5000.0);
}

#[tokio::test]
async fn test_retailer_totals_match_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ingested_pool(dir.path()).await, hanging_endpoint().await, dir.path());

    let (_, data) = get_json(&app, "/api/data").await;
    let (status, summary) = get_json(&app, "/api/summary").await;
    assert_eq!(status, StatusCode::OK);

    let retailer_sum: f64 = data["metrics"]["Total Sales"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_f64().unwrap())
        .sum();
    assert_eq!(retailer_sum, summary["total_sales"].as_f64().unwrap());
    assert_eq!(summary["record_count"], 4);
    assert_eq!(summary["total_units"], 2050.0);
}

#[tokio::test]
async fn test_time_series_is_chronological() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ingested_pool(dir.path()).await, hanging_endpoint().await, dir.path());

    let (status, body) = get_json(&app, "/api/time-series").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([
            {"year": 2020, "month": 1, "Total Sales": 604000.0},
            {"year": 2021, "month": 2, "Total Sales": 15000.0},
        ])
    );
}

#[tokio::test]
async fn test_dashboard_shell_is_html() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ingested_pool(dir.path()).await, hanging_endpoint().await, dir.path());

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("/static/js/dashboard.js"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chart.js"), "console.log('chart');").unwrap();
    let app = app(ingested_pool(dir.path()).await, hanging_endpoint().await, dir.path());

    let (status, body) = get(&app, "/static/chart.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('chart');");
}

#[tokio::test]
async fn test_us_states_forwards_external_json() {
    let dir = tempfile::tempdir().unwrap();
    let external = serde_json::json!([
        ["GEONAME", "BIRTHS", "DEATHS", "state"],
        ["Texas", "382050", "203535", "48"],
    ]);
    let url = json_endpoint(external.clone()).await;
    let app = app(ingested_pool(dir.path()).await, url, dir.path());

    let (status, body) = get_json(&app, "/api/us-states").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, external);
}

#[tokio::test]
async fn test_us_states_timeout_returns_error_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ingested_pool(dir.path()).await, hanging_endpoint().await, dir.path());

    let (status, body) = get_json(&app, "/api/us-states").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    // The server keeps answering afterwards.
    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "running");
    assert_eq!(health["records"], 4);
}

#[tokio::test]
async fn test_query_failure_returns_error_body() {
    let dir = tempfile::tempdir().unwrap();
    // A store without the sales table.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let app = app(pool, hanging_endpoint().await, dir.path());

    for uri in ["/api/data", "/api/time-series", "/api/summary"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("no such table"), "{uri}: {message}");
    }
}
