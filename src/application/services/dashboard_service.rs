//! Aggregation service behind the dashboard endpoints.
//!
//! Every method is a pure read over the full `sales` table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::models::{CategoryCount, CategoryTotal};
use crate::persistence::repository::{Dimension, SalesRepository};
use crate::persistence::StoreError;

/// Per-retailer sums, keyed by metric name then retailer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetailerMetrics {
    #[serde(rename = "Units Sold")]
    pub units_sold: BTreeMap<String, f64>,
    #[serde(rename = "Operating Profit")]
    pub operating_profit: BTreeMap<String, f64>,
    #[serde(rename = "Total Sales")]
    pub total_sales: BTreeMap<String, f64>,
}

/// Combined payload served at `/api/data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub retailer_counts: BTreeMap<String, i64>,
    pub metrics: RetailerMetrics,
    pub product_sales: BTreeMap<String, f64>,
    pub region_data: BTreeMap<String, f64>,
    pub state_data: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub year: i32,
    pub month: u32,
    #[serde(rename = "Total Sales")]
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub total_units: f64,
    /// `None` when the store holds no records.
    pub avg_margin: Option<f64>,
    pub record_count: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    repository: SalesRepository,
}

fn count_map(rows: Vec<CategoryCount>) -> BTreeMap<String, i64> {
    rows.into_iter().map(|r| (r.category, r.count)).collect()
}

fn total_map(rows: Vec<CategoryTotal>) -> BTreeMap<String, f64> {
    rows.into_iter().map(|r| (r.category, r.total)).collect()
}

impl DashboardService {
    pub fn new(repository: SalesRepository) -> Self {
        Self { repository }
    }

    pub async fn retailer_counts(&self) -> Result<BTreeMap<String, i64>, StoreError> {
        Ok(count_map(self.repository.count_by(Dimension::Retailer).await?))
    }

    pub async fn retailer_metrics(&self) -> Result<RetailerMetrics, StoreError> {
        let rows = self.repository.retailer_metrics().await?;

        let mut metrics = RetailerMetrics::default();
        for row in rows {
            metrics.units_sold.insert(row.retailer.clone(), row.units_sold);
            metrics
                .operating_profit
                .insert(row.retailer.clone(), row.operating_profit);
            metrics.total_sales.insert(row.retailer, row.total_sales);
        }
        Ok(metrics)
    }

    pub async fn total_sales_by(
        &self,
        dimension: Dimension,
    ) -> Result<BTreeMap<String, f64>, StoreError> {
        Ok(total_map(self.repository.total_sales_by(dimension).await?))
    }

    pub async fn dashboard_data(&self) -> Result<DashboardData, StoreError> {
        Ok(DashboardData {
            retailer_counts: self.retailer_counts().await?,
            metrics: self.retailer_metrics().await?,
            product_sales: self.total_sales_by(Dimension::Product).await?,
            region_data: self.total_sales_by(Dimension::Region).await?,
            state_data: self.total_sales_by(Dimension::State).await?,
        })
    }

    pub async fn time_series(&self) -> Result<Vec<TimeSeriesPoint>, StoreError> {
        let rows = self.repository.monthly_total_sales().await?;
        Ok(rows
            .into_iter()
            .map(|r| TimeSeriesPoint {
                year: r.year as i32,
                month: r.month as u32,
                total_sales: r.total_sales,
            })
            .collect())
    }

    pub async fn summary(&self) -> Result<SalesSummary, StoreError> {
        let row = self.repository.summary().await?;
        Ok(SalesSummary {
            total_sales: row.total_sales,
            total_units: row.total_units,
            avg_margin: row.avg_margin,
            record_count: row.record_count,
        })
    }

    pub async fn record_count(&self) -> Result<i64, StoreError> {
        self.repository.record_count().await
    }
}
