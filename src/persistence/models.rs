//! Database Models
//!
//! Row shapes returned by the aggregation queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of records in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Summed Total Sales in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Summed metrics for one retailer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RetailerMetricsRecord {
    pub retailer: String,
    pub units_sold: f64,
    pub total_sales: f64,
    pub operating_profit: f64,
}

/// Summed Total Sales for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MonthlyTotalRecord {
    pub year: i64,
    pub month: i64,
    pub total_sales: f64,
}

/// Whole-table totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SummaryRecord {
    pub record_count: i64,
    pub total_sales: f64,
    pub total_units: f64,
    pub avg_margin: Option<f64>,
}
