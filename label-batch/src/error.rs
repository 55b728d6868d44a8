//! Error types for batch operations
//!
//! Only fatal conditions live here. Skipped rows and failed deliveries are
//! recorded in the [`BatchReport`](crate::BatchReport) instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    /// Dataset path does not exist
    #[error("Missing file: {}", .0.display())]
    SourceMissing(PathBuf),

    /// Dataset exists but is not readable as CSV
    #[error("Failed to read {}: {source}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid row range: start {start} is after end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Progress ledger error: {0}")]
    Ledger(#[from] serde_json::Error),
}

pub type BatchResult<T> = Result<T, BatchError>;
