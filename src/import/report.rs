//! Aggregate outcome of one import batch.

use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::import::ImportError;

/// Number of row errors listed in a report by default.
pub const DEFAULT_ERROR_LIMIT: usize = 10;

/// Per-batch counters plus the row errors worth showing to an operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub courses_created: usize,
    pub categories_created: usize,
    /// First `error_limit` messages, formatted `Row <n>: <reason>`.
    pub errors: Vec<String>,
    /// Every row error of the batch, including the ones not listed above.
    #[serde(skip)]
    pub all_errors: Vec<String>,
    #[serde(skip)]
    error_limit: usize,
}

impl ImportReport {
    pub fn new(error_limit: usize) -> Self {
        Self {
            error_limit,
            ..Default::default()
        }
    }

    pub fn record_imported(&mut self) {
        self.imported += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    /// Count a skipped row. `row_number` is the sheet row (header is row 1).
    pub fn record_skipped(&mut self, row_number: usize, reason: impl std::fmt::Display) {
        self.skipped += 1;
        let message = format!("Row {row_number}: {reason}");
        if self.errors.len() < self.error_limit {
            self.errors.push(message.clone());
        }
        self.all_errors.push(message);
    }

    /// Rows seen by the batch.
    pub fn total_rows(&self) -> usize {
        self.imported + self.updated + self.skipped
    }
}

/// Wire shape returned to callers: either a report or a single fatal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ImportReport>,
}

impl From<Result<ImportReport, ImportError>> for ImportResult {
    fn from(outcome: Result<ImportReport, ImportError>) -> Self {
        match outcome {
            Ok(report) => Self {
                success: true,
                error: None,
                details: Some(report),
            },
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
                details: None,
            },
        }
    }
}
