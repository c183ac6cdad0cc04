//! Persistence Layer
//!
//! SQLite storage for the ingested sales records, accessed through sqlx.
//!
//! # Database Schema
//!
//! ## sales
//! One row per sale. Column names match the spreadsheet headers:
//! - "Retailer", "Region", "State", "Product", "Sales Method": TEXT, nullable
//! - "Price per Unit", "Units Sold", "Total Sales", "Operating Profit": REAL >= 0
//! - "Operating Margin": REAL in [0, 1]
//! - "Invoice Date": TEXT (YYYY-MM-DD), nullable
//!
//! Indexes: idx_region, idx_product, idx_retailer, idx_state.
//!
//! The store is written once into a staging file and renamed into place, then
//! only ever opened read-only.

pub mod models;
pub mod repository;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::entities::sales_record::SalesRecord;

/// Database connection pool
pub type DbPool = SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether a finished store is present at `path`.
pub fn store_exists(path: &Path) -> bool {
    path.is_file()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Open an existing store for queries.
pub async fn open_read_only(path: &Path, max_connections: u32) -> Result<DbPool, StoreError> {
    info!("Opening sales store: {}", path.display());

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Write `records` into a fresh store at `path`, replacing any prior content.
///
/// The table and indexes are built in `<path>.partial` and renamed onto
/// `path` only once everything succeeded.
pub async fn build_store(path: &Path, records: &[SalesRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    if staging.exists() {
        debug!("Removing stale staging file {}", staging.display());
        std::fs::remove_file(&staging)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&staging)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .log_statements(tracing::log::LevelFilter::Trace);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let result = populate(&pool, records).await;
    pool.close().await;

    if let Err(e) = result {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }

    std::fs::rename(&staging, path)?;
    info!(
        "✓ Sales store built at {} with {} records",
        path.display(),
        records.len()
    );
    Ok(())
}

async fn populate(pool: &DbPool, records: &[SalesRecord]) -> Result<(), StoreError> {
    create_schema(pool).await?;
    repository::insert_records(pool, records).await?;
    create_indexes(pool).await?;
    Ok(())
}

/// Drop and recreate the sales table
pub async fn create_schema(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::query("DROP TABLE IF EXISTS sales")
        .execute(pool)
        .await
        .map_err(|e| StoreError::SchemaError(format!("Failed to drop sales table: {}", e)))?;

    sqlx::query(
        r#"
        CREATE TABLE sales (
            "Retailer" TEXT,
            "Region" TEXT,
            "State" TEXT,
            "Product" TEXT,
            "Price per Unit" REAL NOT NULL CHECK("Price per Unit" >= 0),
            "Units Sold" REAL NOT NULL CHECK("Units Sold" >= 0),
            "Total Sales" REAL NOT NULL CHECK("Total Sales" >= 0),
            "Operating Profit" REAL NOT NULL CHECK("Operating Profit" >= 0),
            "Operating Margin" REAL NOT NULL CHECK("Operating Margin" BETWEEN 0 AND 1),
            "Sales Method" TEXT,
            "Invoice Date" TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::SchemaError(format!("Failed to create sales table: {}", e)))?;

    Ok(())
}

/// Lookup indexes on the grouped columns
pub async fn create_indexes(pool: &DbPool) -> Result<(), StoreError> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_region ON sales(\"Region\")",
        "CREATE INDEX IF NOT EXISTS idx_product ON sales(\"Product\")",
        "CREATE INDEX IF NOT EXISTS idx_retailer ON sales(\"Retailer\")",
        "CREATE INDEX IF NOT EXISTS idx_state ON sales(\"State\")",
    ];

    for statement in indexes {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::SchemaError(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::amount::Amount;
    use crate::domain::value_objects::margin::Margin;

    fn record(retailer: &str, total_sales: f64) -> SalesRecord {
        SalesRecord {
            retailer: Some(retailer.to_string()),
            region: Some("West".to_string()),
            state: Some("California".to_string()),
            product: Some("Women's Apparel".to_string()),
            price_per_unit: Amount::new(10.0).unwrap(),
            units_sold: Amount::new(5.0).unwrap(),
            total_sales: Amount::new(total_sales).unwrap(),
            operating_profit: Amount::new(1.0).unwrap(),
            operating_margin: Margin::new(0.2).unwrap(),
            sales_method: Some("Online".to_string()),
            invoice_date: None,
        }
    }

    #[tokio::test]
    async fn test_build_store_creates_table_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("sales.db");

        build_store(&path, &[record("A", 1.0), record("B", 2.0)])
            .await
            .unwrap();
        assert!(store_exists(&path));
        assert!(!staging_path(&path).exists());

        let pool = open_read_only(&path, 2).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 2);

        let indexes: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name IN ('idx_region', 'idx_product', 'idx_retailer', 'idx_state')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(indexes.0, 4);
    }

    #[tokio::test]
    async fn test_build_store_replaces_prior_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.db");

        build_store(&path, &[record("A", 1.0), record("B", 2.0)])
            .await
            .unwrap();
        build_store(&path, &[record("C", 3.0)]).await.unwrap();

        let pool = open_read_only(&path, 1).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_read_only_store_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.db");
        build_store(&path, &[record("A", 1.0)]).await.unwrap();

        let pool = open_read_only(&path, 1).await.unwrap();
        let result = sqlx::query("DELETE FROM sales").execute(&pool).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("data/sales.db")),
            PathBuf::from("data/sales.db.partial")
        );
    }
}
