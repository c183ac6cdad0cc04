use std::sync::Arc;

use sales_dashboard::application::handlers::dashboard_handler::{router, AppState};
use sales_dashboard::application::services::dashboard_service::DashboardService;
use sales_dashboard::application::services::ingestion_service::{
    IngestionOutcome, IngestionService,
};
use sales_dashboard::config::AppConfig;
use sales_dashboard::infrastructure::demographics_client::DemographicsClient;
use sales_dashboard::infrastructure::spreadsheet_reader::SpreadsheetReader;
use sales_dashboard::persistence::{self, repository::SalesRepository};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_dashboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!("Sales dashboard starting");
    info!(
        "Spreadsheet: {}, store: {}",
        config.spreadsheet_path.display(),
        config.store_path.display()
    );

    // Ingestion must finish before any request is served
    let mut reader = SpreadsheetReader::new(config.header_row);
    if let Some(sheet) = &config.sheet_name {
        reader = reader.with_sheet(sheet.clone());
    }
    let ingestion = IngestionService::new(reader, &config.spreadsheet_path, &config.store_path);

    match ingestion.run().await {
        Ok(IngestionOutcome::Built { records }) => {
            info!("✓ Ingested {} sales records", records);
        }
        Ok(IngestionOutcome::AlreadyPresent) => {
            info!("Using existing sales store");
        }
        Err(e) => {
            error!("Ingestion failed: {}", e);
            return Err(e.into());
        }
    }

    let pool = persistence::open_read_only(&config.store_path, config.max_connections).await?;
    let demographics =
        DemographicsClient::new(config.demographics_url.clone(), config.demographics_timeout)?;

    let state = Arc::new(AppState {
        dashboard: DashboardService::new(SalesRepository::new(pool.clone())),
        demographics,
    });
    let app = router(state, &config.static_dir);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let server = axum::serve(listener, app);

    let shutdown_signal = async move {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Server started successfully. Press Ctrl+C to stop.");
    server.with_graceful_shutdown(shutdown_signal).await?;

    info!("Server shutting down gracefully...");
    pool.close().await;

    info!("Shutdown complete");
    Ok(())
}
