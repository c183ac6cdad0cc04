//! Spreadsheet loading through calamine.
//!
//! The sales workbook carries a title block above the real header row, so the
//! reader takes headers from a fixed absolute row and treats everything below
//! it as data.

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entities::raw_table::{RawCell, RawRow, RawTable};

/// Zero-based sheet row holding the column headers (title, blank rows, headers).
pub const DEFAULT_HEADER_ROW: u32 = 4;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Spreadsheet not found: {0}")]
    Missing(String),

    #[error("Failed to open spreadsheet {path}: {reason}")]
    Unparsable { path: String, reason: String },

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Header row {0} is missing or blank")]
    MissingHeader(u32),
}

#[derive(Debug, Clone)]
pub struct SpreadsheetReader {
    header_row: u32,
    sheet: Option<String>,
}

impl Default for SpreadsheetReader {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_ROW)
    }
}

impl SpreadsheetReader {
    pub fn new(header_row: u32) -> Self {
        Self {
            header_row,
            sheet: None,
        }
    }

    /// Reads the named sheet instead of the first one.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn header_row(&self) -> u32 {
        self.header_row
    }

    pub fn read(&self, path: &Path) -> Result<RawTable, ReadError> {
        if !path.is_file() {
            return Err(ReadError::Missing(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| ReadError::Unparsable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let sheet = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ReadError::SheetNotFound("<first>".to_string()))?,
        };

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|_| ReadError::SheetNotFound(sheet.clone()))?;

        let table = table_from_range(&range, self.header_row)?;
        info!(
            "Read {} data rows from {} (sheet '{}')",
            table.len(),
            path.display(),
            sheet
        );
        Ok(table)
    }
}

/// Builds a table from a worksheet range. `header_row` is an absolute sheet
/// row; calamine ranges may start below row 0 when leading rows are empty.
pub fn table_from_range(range: &Range<Data>, header_row: u32) -> Result<RawTable, ReadError> {
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return Err(ReadError::MissingHeader(header_row));
    };
    if header_row < start.0 || header_row > end.0 {
        return Err(ReadError::MissingHeader(header_row));
    }

    let headers: Vec<String> = (start.1..=end.1)
        .map(|col| {
            range
                .get_value((header_row, col))
                .map(header_text)
                .unwrap_or_default()
        })
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ReadError::MissingHeader(header_row));
    }

    let rows: Vec<RawRow> = ((header_row + 1)..=end.0)
        .map(|r| RawRow {
            line: r + 1,
            cells: (start.1..=end.1)
                .map(|col| range.get_value((r, col)).map(raw_cell).unwrap_or(RawCell::Empty))
                .collect(),
        })
        .filter(|row| !row.cells.iter().all(RawCell::is_empty))
        .collect();

    debug!(
        "Header row {} has {} columns, {} data rows follow",
        header_row,
        headers.len(),
        rows.len()
    );
    Ok(RawTable::new(headers, rows))
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.trim().to_string()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match data.as_date() {
            Some(date) => RawCell::Date(date),
            None => RawCell::Text(data.to_string()),
        },
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Text(format!("#ERROR:{:?}", e)),
    }
}
