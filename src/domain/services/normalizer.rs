//! Turns raw spreadsheet rows into validated [`SalesRecord`]s.
//!
//! Currency-like columns arrive either as numbers or as text such as
//! `"$1,234.50"`; margins arrive as `"12.5%"`. Numeric cells are taken as
//! already normalized, so a table that went through the conversion once is
//! passed through unchanged instead of being divided again.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::entities::raw_table::{RawCell, RawRow, RawTable};
use crate::domain::entities::sales_record::{columns, SalesRecord};
use crate::domain::errors::ValidationError;
use crate::domain::value_objects::amount::Amount;
use crate::domain::value_objects::margin::Margin;

/// Columns stored as currency or unit strings in the source sheet.
pub const CURRENCY_COLUMNS: [&str; 4] = [
    columns::TOTAL_SALES,
    columns::UNITS_SOLD,
    columns::OPERATING_PROFIT,
    columns::PRICE_PER_UNIT,
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parses text like `"$1,234.50"` by dropping `$` and group separators.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses text like `"12.5%"` into the fraction `0.125`.
pub fn parse_percentage(raw: &str) -> Option<f64> {
    raw.trim()
        .strip_suffix('%')?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / 100.0)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Positions of every expected column within the header row.
struct ColumnMap {
    retailer: usize,
    region: usize,
    state: usize,
    product: usize,
    price_per_unit: usize,
    units_sold: usize,
    total_sales: usize,
    operating_profit: usize,
    operating_margin: usize,
    sales_method: usize,
    invoice_date: usize,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, ValidationError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| ValidationError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            retailer: find(columns::RETAILER)?,
            region: find(columns::REGION)?,
            state: find(columns::STATE)?,
            product: find(columns::PRODUCT)?,
            price_per_unit: find(columns::PRICE_PER_UNIT)?,
            units_sold: find(columns::UNITS_SOLD)?,
            total_sales: find(columns::TOTAL_SALES)?,
            operating_profit: find(columns::OPERATING_PROFIT)?,
            operating_margin: find(columns::OPERATING_MARGIN)?,
            sales_method: find(columns::SALES_METHOD)?,
            invoice_date: find(columns::INVOICE_DATE)?,
        })
    }
}

/// Converts every data row of `table`. The first bad value aborts the whole
/// conversion; rows are never skipped or zero-filled.
pub fn normalize(table: &RawTable) -> Result<Vec<SalesRecord>, ValidationError> {
    let map = ColumnMap::resolve(table)?;

    let records = table
        .rows
        .iter()
        .map(|row| normalize_row(row, &map))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Normalized {} sales records", records.len());
    Ok(records)
}

fn normalize_row(row: &RawRow, map: &ColumnMap) -> Result<SalesRecord, ValidationError> {
    Ok(SalesRecord {
        retailer: category(row.cell(map.retailer)),
        region: category(row.cell(map.region)),
        state: category(row.cell(map.state)),
        product: category(row.cell(map.product)),
        price_per_unit: amount(row, map.price_per_unit, columns::PRICE_PER_UNIT)?,
        units_sold: amount(row, map.units_sold, columns::UNITS_SOLD)?,
        total_sales: amount(row, map.total_sales, columns::TOTAL_SALES)?,
        operating_profit: amount(row, map.operating_profit, columns::OPERATING_PROFIT)?,
        operating_margin: margin(row, map.operating_margin)?,
        sales_method: category(row.cell(map.sales_method)),
        invoice_date: invoice_date(row, map.invoice_date)?,
    })
}

fn unparsable(row: &RawRow, column: &str, cell: &RawCell) -> ValidationError {
    ValidationError::Unparsable {
        row: row.line,
        column: column.to_string(),
        value: cell.display_value(),
    }
}

fn out_of_range(row: &RawRow, column: &str, reason: String) -> ValidationError {
    ValidationError::OutOfRange {
        row: row.line,
        column: column.to_string(),
        reason,
    }
}

fn amount(row: &RawRow, index: usize, column: &str) -> Result<Amount, ValidationError> {
    let cell = row.cell(index);
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(s) => parse_currency(s).ok_or_else(|| unparsable(row, column, cell))?,
        RawCell::Empty | RawCell::Date(_) => return Err(unparsable(row, column, cell)),
    };
    Amount::new(value).map_err(|reason| out_of_range(row, column, reason))
}

fn margin(row: &RawRow, index: usize) -> Result<Margin, ValidationError> {
    let column = columns::OPERATING_MARGIN;
    let cell = row.cell(index);
    let fraction = match cell {
        // Percent-formatted cells already hold the fraction.
        RawCell::Number(n) => *n,
        RawCell::Text(s) => parse_percentage(s).ok_or_else(|| unparsable(row, column, cell))?,
        RawCell::Empty | RawCell::Date(_) => return Err(unparsable(row, column, cell)),
    };
    Margin::new(fraction).map_err(|reason| out_of_range(row, column, reason))
}

fn category(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Empty => None,
        RawCell::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        other => Some(other.display_value()),
    }
}

fn invoice_date(row: &RawRow, index: usize) -> Result<Option<NaiveDate>, ValidationError> {
    let cell = row.cell(index);
    match cell {
        RawCell::Empty => Ok(None),
        RawCell::Date(d) => Ok(Some(*d)),
        RawCell::Text(s) if s.trim().is_empty() => Ok(None),
        RawCell::Text(s) => parse_date(s).map(Some).ok_or_else(|| ValidationError::InvalidDate {
            row: row.line,
            column: columns::INVOICE_DATE.to_string(),
            value: s.clone(),
        }),
        RawCell::Number(_) => Err(ValidationError::InvalidDate {
            row: row.line,
            column: columns::INVOICE_DATE.to_string(),
            value: cell.display_value(),
        }),
    }
}
