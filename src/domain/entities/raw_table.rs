//! Untyped spreadsheet content as read from disk, before normalization.

use chrono::NaiveDate;

/// A single spreadsheet cell after the reader has decided its basic kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    /// Renders the cell the way it would appear in an error message.
    pub fn display_value(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => n.to_string(),
            RawCell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// A data row together with its 1-based line number in the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: u32,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn cell(&self, index: usize) -> &RawCell {
        self.cells.get(index).unwrap_or(&RawCell::Empty)
    }
}

/// Header names plus the data rows that follow the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        let table = RawTable::new(
            vec!["Retailer".to_string(), "Total Sales".to_string()],
            vec![],
        );
        assert_eq!(table.column_index("Total Sales"), Some(1));
        assert_eq!(table.column_index("Region"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_short_row_reads_as_empty() {
        let row = RawRow {
            line: 6,
            cells: vec![RawCell::Text("Walmart".to_string())],
        };
        assert_eq!(row.cell(0), &RawCell::Text("Walmart".to_string()));
        assert!(row.cell(5).is_empty());
    }
}
