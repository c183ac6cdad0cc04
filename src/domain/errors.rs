use thiserror::Error;

/// Raised when spreadsheet content cannot be turned into valid sales records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}, column '{column}': cannot parse {value:?} as a number")]
    Unparsable {
        row: u32,
        column: String,
        value: String,
    },

    #[error("Row {row}, column '{column}': {reason}")]
    OutOfRange {
        row: u32,
        column: String,
        reason: String,
    },

    #[error("Row {row}, column '{column}': cannot parse {value:?} as a date")]
    InvalidDate {
        row: u32,
        column: String,
        value: String,
    },
}

impl ValidationError {
    /// Sheet line the error refers to, if any.
    pub fn row(&self) -> Option<u32> {
        match self {
            ValidationError::MissingColumn(_) => None,
            ValidationError::Unparsable { row, .. }
            | ValidationError::OutOfRange { row, .. }
            | ValidationError::InvalidDate { row, .. } => Some(*row),
        }
    }
}
