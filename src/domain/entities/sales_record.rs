use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::value_objects::amount::Amount;
use crate::domain::value_objects::margin::Margin;

/// Header names expected in the sales spreadsheet. They double as the
/// column names of the `sales` table.
pub mod columns {
    pub const RETAILER: &str = "Retailer";
    pub const REGION: &str = "Region";
    pub const STATE: &str = "State";
    pub const PRODUCT: &str = "Product";
    pub const PRICE_PER_UNIT: &str = "Price per Unit";
    pub const UNITS_SOLD: &str = "Units Sold";
    pub const TOTAL_SALES: &str = "Total Sales";
    pub const OPERATING_PROFIT: &str = "Operating Profit";
    pub const OPERATING_MARGIN: &str = "Operating Margin";
    pub const SALES_METHOD: &str = "Sales Method";
    pub const INVOICE_DATE: &str = "Invoice Date";

    pub const ALL: [&str; 11] = [
        RETAILER,
        REGION,
        STATE,
        PRODUCT,
        PRICE_PER_UNIT,
        UNITS_SOLD,
        TOTAL_SALES,
        OPERATING_PROFIT,
        OPERATING_MARGIN,
        SALES_METHOD,
        INVOICE_DATE,
    ];
}

/// One historical sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub retailer: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub product: Option<String>,
    pub price_per_unit: Amount,
    pub units_sold: Amount,
    pub total_sales: Amount,
    pub operating_profit: Amount,
    pub operating_margin: Margin,
    pub sales_method: Option<String>,
    pub invoice_date: Option<NaiveDate>,
}
