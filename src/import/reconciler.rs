//! Batch orchestration: fatal preconditions first, then every row in order.

use crate::auth::Authorizer;
use crate::import::resolver::EntityResolver;
use crate::import::source::SheetSource;
use crate::import::tabular::{SheetRow, parse_rows};
use crate::import::upsert::{UpsertOutcome, upsert_problem};
use crate::import::validate::{HeaderIndex, validate_row};
use crate::import::{ImportConfig, ImportError, ImportReport, RowError};
use crate::store::EntityStore;

/// Applies parsed sheet rows to the store.
///
/// Rows run strictly in source order: later rows must see the courses,
/// categories and problems written by earlier ones. A failing row is counted
/// as skipped and never stops the batch.
pub struct BatchReconciler<'a> {
    store: &'a dyn EntityStore,
    error_limit: usize,
}

impl<'a> BatchReconciler<'a> {
    pub fn new(store: &'a dyn EntityStore, error_limit: usize) -> Self {
        Self { store, error_limit }
    }

    pub async fn reconcile_text(&self, raw: &str) -> Result<ImportReport, ImportError> {
        self.reconcile_bytes(raw.as_bytes()).await
    }

    /// Parse a raw export and reconcile it. Encoding and syntax errors are fatal.
    pub async fn reconcile_bytes(&self, raw: &[u8]) -> Result<ImportReport, ImportError> {
        let rows = parse_rows(raw)?;
        self.reconcile_rows(&rows).await
    }

    /// `rows[0]` is the header.
    pub async fn reconcile_rows(&self, rows: &[SheetRow]) -> Result<ImportReport, ImportError> {
        let (header, data) = match rows.split_first() {
            Some((header, data)) if !data.is_empty() => (header, data),
            _ => return Err(ImportError::Empty),
        };
        let index = HeaderIndex::from_header(&header.cells)?;

        // Fresh caches for every batch.
        let mut resolver = EntityResolver::load(self.store)
            .await
            .map_err(ImportError::Store)?;
        let mut report = ImportReport::new(self.error_limit);

        log::info!("import batch started: {} data rows", data.len());

        for row in data {
            let row_number = row.number;
            match self.reconcile_row(&mut resolver, &index, &row.cells).await {
                Ok(UpsertOutcome::Created) => report.record_imported(),
                Ok(UpsertOutcome::Updated) => report.record_updated(),
                Err(err) => {
                    log::warn!("row {} skipped: {}", row_number, err);
                    report.record_skipped(row_number, err);
                }
            }
        }

        report.courses_created = resolver.courses_created();
        report.categories_created = resolver.categories_created();

        log::info!(
            "import batch finished: imported={} updated={} skipped={} courses_created={} categories_created={}",
            report.imported,
            report.updated,
            report.skipped,
            report.courses_created,
            report.categories_created
        );

        Ok(report)
    }

    async fn reconcile_row(
        &self,
        resolver: &mut EntityResolver<'a>,
        index: &HeaderIndex,
        cells: &[String],
    ) -> Result<UpsertOutcome, RowError> {
        let row = validate_row(cells, index)?;
        let course = resolver.resolve_course(&row.course_name).await?;
        let category = resolver.resolve_category(&course, &row.lecture_name).await?;
        let (outcome, problem) = upsert_problem(self.store, &category, &row.to_draft()).await?;

        log::debug!(
            "problem '{}' (id {}) {:?} in category {}",
            problem.name,
            problem.id,
            outcome,
            category.id
        );
        Ok(outcome)
    }
}

/// Full import: authorization, configuration and fetch, then reconciliation.
pub struct ImportPipeline<'a> {
    config: &'a ImportConfig,
    store: &'a dyn EntityStore,
    authorizer: &'a dyn Authorizer,
    source: &'a dyn SheetSource,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(
        config: &'a ImportConfig,
        store: &'a dyn EntityStore,
        authorizer: &'a dyn Authorizer,
        source: &'a dyn SheetSource,
    ) -> Self {
        Self {
            config,
            store,
            authorizer,
            source,
        }
    }

    pub async fn run(&self, token: Option<&str>) -> Result<ImportReport, ImportError> {
        if !self.authorizer.is_authorized(token) {
            log::warn!("import rejected: invalid authentication");
            return Err(ImportError::Unauthorized);
        }

        let sheet_id = self
            .config
            .sheet_id
            .as_deref()
            .ok_or(ImportError::NotConfigured)?;

        let raw = self.source.fetch(sheet_id).await?;

        BatchReconciler::new(self.store, self.config.error_limit)
            .reconcile_bytes(&raw)
            .await
    }
}
