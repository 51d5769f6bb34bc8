//! Retrieval of the raw spreadsheet export.

use std::sync::Arc;
use std::time::Duration;

use crate::import::{ImportConfig, ImportError};

pub type SharedSheetSource = Arc<dyn SheetSource>;

/// Where batch input comes from. One call per batch, never retried.
///
/// Returns the raw export bytes; the parser does the decoding.
#[rocket::async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch(&self, sheet_id: &str) -> Result<Vec<u8>, ImportError>;
}

/// Downloads the CSV export of a spreadsheet over HTTP.
#[derive(Clone)]
pub struct HttpSheetSource {
    http: reqwest::Client,
    config: ImportConfig,
}

impl HttpSheetSource {
    pub fn new(config: ImportConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("bugspot-import/0.1")
            .build()?;

        Ok(Self { http, config })
    }
}

#[rocket::async_trait]
impl SheetSource for HttpSheetSource {
    async fn fetch(&self, sheet_id: &str) -> Result<Vec<u8>, ImportError> {
        let url = self.config.export_url(sheet_id);
        log::info!("fetching spreadsheet export for sheet {}", sheet_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ImportError::Fetch(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::FetchStatus(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ImportError::Fetch(err.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Serves a fixed document, for imports from a local file.
pub struct StaticSheetSource(pub String);

#[rocket::async_trait]
impl SheetSource for StaticSheetSource {
    async fn fetch(&self, _sheet_id: &str) -> Result<Vec<u8>, ImportError> {
        Ok(self.0.clone().into_bytes())
    }
}
