use std::env;
use std::time::Duration;

use crate::import::report::DEFAULT_ERROR_LIMIT;

pub const DEFAULT_EXPORT_URL: &str =
    "https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv";

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

/// Settings for spreadsheet imports.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Spreadsheet to import from. Imports fail fast when unset.
    pub sheet_id: Option<String>,
    /// Export URL template; `{sheet_id}` is replaced with the sheet id.
    pub export_url_template: String,
    /// Optional worksheet tab, appended as `gid=`.
    pub sheet_gid: Option<String>,
    pub request_timeout: Duration,
    /// Row errors listed in a report.
    pub error_limit: usize,
}

impl ImportConfig {
    pub fn from_env() -> Self {
        Self {
            sheet_id: env_optional("BUGSPOT_SHEET_ID"),
            export_url_template: env_string("BUGSPOT_SHEET_EXPORT_URL", DEFAULT_EXPORT_URL),
            sheet_gid: env_optional("BUGSPOT_SHEET_GID"),
            request_timeout: env_duration_millis("BUGSPOT_IMPORT_TIMEOUT_MS", 30_000),
            error_limit: env_usize("BUGSPOT_IMPORT_ERROR_LIMIT", DEFAULT_ERROR_LIMIT),
        }
    }

    /// Build the CSV export URL for `sheet_id`.
    pub fn export_url(&self, sheet_id: &str) -> String {
        let mut url = self.export_url_template.replace("{sheet_id}", sheet_id);
        if let Some(gid) = &self.sheet_gid {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str("gid=");
            url.push_str(gid);
        }
        url
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sheet_id: None,
            export_url_template: DEFAULT_EXPORT_URL.to_string(),
            sheet_gid: None,
            request_timeout: Duration::from_secs(30),
            error_limit: DEFAULT_ERROR_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_substitutes_sheet_id() {
        let config = ImportConfig::default();
        assert_eq!(
            config.export_url("abc123"),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }

    #[test]
    fn export_url_appends_gid() {
        let config = ImportConfig {
            sheet_gid: Some("42".into()),
            ..Default::default()
        };
        assert!(config.export_url("abc").ends_with("?format=csv&gid=42"));

        let bare = ImportConfig {
            export_url_template: "http://sheets.local/{sheet_id}.csv".into(),
            sheet_gid: Some("7".into()),
            ..Default::default()
        };
        assert_eq!(bare.export_url("s1"), "http://sheets.local/s1.csv?gid=7");
    }
}
