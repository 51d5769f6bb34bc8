//! Spreadsheet import of bug-spotting problems.
//!
//! A batch moves through these stages:
//!
//! 1. **Preconditions** (`reconciler::ImportPipeline`) - caller authorization,
//!    configured sheet id, fetch of the CSV export (`source`)
//! 2. **Parsing** (`tabular`) - CSV text into trimmed rows, header first
//! 3. **Validation** (`validate`) - header columns once, then each row
//! 4. **Resolution** (`resolver`) - find-or-create course and category with
//!    batch-scoped caches
//! 5. **Upsert** (`upsert`) - create or update the problem by natural key
//! 6. **Reporting** (`report`) - counters and the capped row error list
//!
//! Any failure in stage 1-3's batch-level checks aborts with an
//! [`ImportError`]; a failure inside one row is a [`RowError`], counted as a
//! skip, and the batch moves on.

pub mod config;
pub mod error;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod source;
pub mod tabular;
pub mod upsert;
pub mod validate;

pub use config::ImportConfig;
pub use error::{ImportError, RowError};
pub use reconciler::{BatchReconciler, ImportPipeline};
pub use report::{ImportReport, ImportResult};
pub use source::{HttpSheetSource, SharedSheetSource, SheetSource, StaticSheetSource};
