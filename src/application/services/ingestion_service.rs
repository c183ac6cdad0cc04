//! One-time ingestion: spreadsheet → normalized records → SQLite store.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::errors::ValidationError;
use crate::domain::services::normalizer;
use crate::infrastructure::spreadsheet_reader::{ReadError, SpreadsheetReader};
use crate::persistence::{self, StoreError};

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionOutcome {
    Built { records: usize },
    AlreadyPresent,
}

pub struct IngestionService {
    reader: SpreadsheetReader,
    spreadsheet_path: PathBuf,
    store_path: PathBuf,
}

impl IngestionService {
    pub fn new(
        reader: SpreadsheetReader,
        spreadsheet_path: impl Into<PathBuf>,
        store_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reader,
            spreadsheet_path: spreadsheet_path.into(),
            store_path: store_path.into(),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Builds the store unless one already exists. An existing store is never
    /// checked against the spreadsheet.
    pub async fn run(&self) -> Result<IngestionOutcome, IngestionError> {
        if persistence::store_exists(&self.store_path) {
            info!(
                "Sales store {} already exists, skipping ingestion",
                self.store_path.display()
            );
            return Ok(IngestionOutcome::AlreadyPresent);
        }

        info!(
            "Ingesting {} into {}",
            self.spreadsheet_path.display(),
            self.store_path.display()
        );

        let table = self.reader.read(&self.spreadsheet_path)?;
        if table.is_empty() {
            warn!("Spreadsheet {} has no data rows", self.spreadsheet_path.display());
        }

        let records = normalizer::normalize(&table)?;
        persistence::build_store(&self.store_path, &records).await?;

        Ok(IngestionOutcome::Built {
            records: records.len(),
        })
    }
}
