use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::demographics_client::DEFAULT_DEMOGRAPHICS_URL;
use crate::infrastructure::spreadsheet_reader::DEFAULT_HEADER_ROW;

/// Runtime configuration for the dashboard server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spreadsheet_path: PathBuf,
    pub store_path: PathBuf,
    pub sheet_name: Option<String>,
    pub header_row: u32,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub demographics_url: String,
    pub demographics_timeout: Option<Duration>,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spreadsheet_path: PathBuf::from("data/adidas_sales.xlsx"),
            store_path: PathBuf::from("data/sales.db"),
            sheet_name: None,
            header_row: DEFAULT_HEADER_ROW,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            static_dir: PathBuf::from("static"),
            demographics_url: DEFAULT_DEMOGRAPHICS_URL.to_string(),
            demographics_timeout: None,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("SALES_SPREADSHEET") {
            config.spreadsheet_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("SALES_DB_PATH") {
            config.store_path = PathBuf::from(path);
        }

        if let Some(sheet) = lookup("SALES_SHEET") {
            if !sheet.trim().is_empty() {
                config.sheet_name = Some(sheet);
            }
        }

        if let Some(row) = lookup("SALES_HEADER_ROW") {
            match row.parse::<u32>() {
                Ok(value) => config.header_row = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse SALES_HEADER_ROW '{}': {}, using default: {}",
                        row,
                        e,
                        config.header_row
                    );
                }
            }
        }

        if let Some(addr) = lookup("BIND_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(value) => config.bind_addr = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse BIND_ADDR '{}': {}, using default: {}",
                        addr,
                        e,
                        config.bind_addr
                    );
                }
            }
        }

        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        if let Some(url) = lookup("DEMOGRAPHICS_URL") {
            config.demographics_url = url;
        }

        if let Some(timeout) = lookup("DEMOGRAPHICS_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(value) if value > 0 => {
                    config.demographics_timeout = Some(Duration::from_millis(value));
                }
                _ => {
                    tracing::warn!(
                        "Invalid DEMOGRAPHICS_TIMEOUT_MS value: {} (must be a positive integer), using client default",
                        timeout
                    );
                }
            }
        }

        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            if let Ok(value) = max.parse::<u32>() {
                if value > 0 {
                    config.max_connections = value;
                }
            }
        }

        config
    }
}
