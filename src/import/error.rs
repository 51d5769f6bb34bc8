use reqwest::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Conditions that abort a whole batch before any row is processed.
///
/// The `Display` text is the message handed back to the caller.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid authentication")]
    Unauthorized,
    #[error("Spreadsheet ID not configured")]
    NotConfigured,
    #[error("Failed to fetch spreadsheet: {0}")]
    Fetch(String),
    #[error("Failed to fetch spreadsheet: HTTP {0}")]
    FetchStatus(StatusCode),
    #[error("Failed to parse CSV: {0}")]
    Parse(String),
    #[error("Spreadsheet is empty or has only headers")]
    Empty,
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    /// The store could not be read while preparing the batch.
    #[error("Failed to load existing content: {0}")]
    Store(StoreError),
}

/// Why a single row was skipped. The batch carries on.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("Column count mismatch: expected {expected}, got {actual}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid JSON format in reasons field")]
    InvalidReasons,
    #[error("Invalid JSON format in reasons field: expected an object")]
    ReasonsNotObject,
    #[error("{0}")]
    Store(#[from] StoreError),
}
