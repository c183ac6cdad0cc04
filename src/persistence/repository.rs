//! Database Repository
//!
//! Read queries over the `sales` table, plus the bulk insert used while the
//! store is built.

use super::models::*;
use super::{DbPool, StoreError};
use crate::domain::entities::sales_record::{columns, SalesRecord};
use tracing::{debug, error};

/// Label used for rows whose grouping column is NULL.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Categorical columns the dashboard groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Retailer,
    Product,
    Region,
    State,
}

impl Dimension {
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Retailer => columns::RETAILER,
            Dimension::Product => columns::PRODUCT,
            Dimension::Region => columns::REGION,
            Dimension::State => columns::STATE,
        }
    }

    fn group_key(self) -> String {
        format!("COALESCE(\"{}\", '{}')", self.column(), UNKNOWN_CATEGORY)
    }
}

/// Insert all records in a single transaction
pub(super) async fn insert_records(pool: &DbPool, records: &[SalesRecord]) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO sales (
                "Retailer", "Region", "State", "Product", "Price per Unit",
                "Units Sold", "Total Sales", "Operating Profit", "Operating Margin",
                "Sales Method", "Invoice Date"
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&record.retailer)
        .bind(&record.region)
        .bind(&record.state)
        .bind(&record.product)
        .bind(record.price_per_unit.value())
        .bind(record.units_sold.value())
        .bind(record.total_sales.value())
        .bind(record.operating_profit.value())
        .bind(record.operating_margin.value())
        .bind(&record.sales_method)
        .bind(record.invoice_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert sales record: {}", e);
            StoreError::QueryError(format!("Failed to insert sales record: {}", e))
        })?;
    }

    tx.commit().await?;
    debug!("Inserted {} sales records", records.len());
    Ok(())
}

/// Sales repository
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: DbPool,
}

impl SalesRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of records per category of `dimension`
    pub async fn count_by(&self, dimension: Dimension) -> Result<Vec<CategoryCount>, StoreError> {
        let sql = format!(
            "SELECT {key} AS category, COUNT(*) AS count FROM sales GROUP BY {key} ORDER BY category",
            key = dimension.group_key()
        );

        sqlx::query_as::<_, CategoryCount>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to count by {:?}: {}", dimension, e);
                StoreError::QueryError(format!("Failed to count by {:?}: {}", dimension, e))
            })
    }

    /// Sum of Total Sales per category of `dimension`
    pub async fn total_sales_by(&self, dimension: Dimension) -> Result<Vec<CategoryTotal>, StoreError> {
        let sql = format!(
            "SELECT {key} AS category, COALESCE(SUM(\"Total Sales\"), 0.0) AS total FROM sales GROUP BY {key} ORDER BY category",
            key = dimension.group_key()
        );

        sqlx::query_as::<_, CategoryTotal>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to sum sales by {:?}: {}", dimension, e);
                StoreError::QueryError(format!("Failed to sum sales by {:?}: {}", dimension, e))
            })
    }

    /// Units sold, total sales and operating profit per retailer
    pub async fn retailer_metrics(&self) -> Result<Vec<RetailerMetricsRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT
                {key} AS retailer,
                COALESCE(SUM("Units Sold"), 0.0) AS units_sold,
                COALESCE(SUM("Total Sales"), 0.0) AS total_sales,
                COALESCE(SUM("Operating Profit"), 0.0) AS operating_profit
            FROM sales
            GROUP BY {key}
            ORDER BY retailer
            "#,
            key = Dimension::Retailer.group_key()
        );

        sqlx::query_as::<_, RetailerMetricsRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to get retailer metrics: {}", e);
                StoreError::QueryError(format!("Failed to get retailer metrics: {}", e))
            })
    }

    /// Total Sales per (year, month) of Invoice Date, oldest first. Rows
    /// without a date are left out.
    pub async fn monthly_total_sales(&self) -> Result<Vec<MonthlyTotalRecord>, StoreError> {
        sqlx::query_as::<_, MonthlyTotalRecord>(
            r#"
            SELECT
                CAST(strftime('%Y', "Invoice Date") AS INTEGER) AS year,
                CAST(strftime('%m', "Invoice Date") AS INTEGER) AS month,
                COALESCE(SUM("Total Sales"), 0.0) AS total_sales
            FROM sales
            WHERE "Invoice Date" IS NOT NULL
            GROUP BY year, month
            ORDER BY year, month
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get monthly sales: {}", e);
            StoreError::QueryError(format!("Failed to get monthly sales: {}", e))
        })
    }

    /// Totals over the whole table
    pub async fn summary(&self) -> Result<SummaryRecord, StoreError> {
        sqlx::query_as::<_, SummaryRecord>(
            r#"
            SELECT
                COUNT(*) AS record_count,
                COALESCE(SUM("Total Sales"), 0.0) AS total_sales,
                COALESCE(SUM("Units Sold"), 0.0) AS total_units,
                AVG("Operating Margin") AS avg_margin
            FROM sales
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get sales summary: {}", e);
            StoreError::QueryError(format!("Failed to get sales summary: {}", e))
        })
    }

    pub async fn record_count(&self) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryError(format!("Failed to count records: {}", e)))?;
        Ok(row.0)
    }
}
