//! Analysis service integration (`POST /upload`).
//!
//! The service is an opaque collaborator: we send the selected statement files
//! as `multipart/form-data` and receive a `MetricsResponse` as JSON. Anything
//! other than a 2xx status is a failure with an unspecified body.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use thiserror::Error;

use crate::domain::{FileSelection, MetricsResponse};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
const UPLOAD_PATH: &str = "/upload";

/// Longest slice of an error body we keep for diagnostics.
const ERROR_BODY_LIMIT: usize = 512;

/// Why a submission failed. The raw detail is for logs, not for users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Connection refused, DNS failure, timeout, broken pipe...
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },
    /// 2xx status, but the body is not a metrics payload.
    #[error("malformed metrics response: {0}")]
    MalformedResponse(String),
}

/// One multipart part: slot name, file name and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: &'static str,
    pub file_name: String,
    pub content: std::sync::Arc<[u8]>,
}

/// Transport-agnostic description of an upload request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub parts: Vec<FormPart>,
}

impl UploadForm {
    /// Package exactly the files present in `selection`; empty slots are omitted.
    pub fn from_selection(selection: &FileSelection) -> Self {
        let parts = selection
            .iter()
            .map(|(slot, file)| FormPart {
                name: slot.form_name(),
                file_name: file.file_name.clone(),
                content: file.content.clone(),
            })
            .collect();
        Self { parts }
    }

    pub fn part_names(&self) -> Vec<&'static str> {
        self.parts.iter().map(|p| p.name).collect()
    }

    fn into_multipart(self) -> Form {
        self.parts.into_iter().fold(Form::new(), |form, part| {
            let body = Part::bytes(part.content.to_vec()).file_name(part.file_name);
            form.part(part.name, body)
        })
    }
}

/// Seam between the orchestrator and the network.
pub trait AnalysisService: Send + Sync {
    fn upload(&self, form: UploadForm) -> Result<MetricsResponse, SubmitError>;
}

/// Connection settings for the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Read `FOLIO_SERVICE_URL` / `FOLIO_TIMEOUT_SECS` (a `.env` file is honored).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(url) = lookup("FOLIO_SERVICE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("FOLIO_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::usage(format!("Invalid FOLIO_TIMEOUT_SECS '{raw}'.")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn upload_url(&self) -> String {
        format!("{}{UPLOAD_PATH}", self.base_url.trim_end_matches('/'))
    }
}

/// Blocking `reqwest` implementation of `AnalysisService`.
pub struct HttpAnalysisService {
    client: Client,
    upload_url: String,
}

impl HttpAnalysisService {
    pub fn new(config: &ServiceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            upload_url: config.upload_url(),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl AnalysisService for HttpAnalysisService {
    fn upload(&self, form: UploadForm) -> Result<MetricsResponse, SubmitError> {
        log::debug!("POST {} parts={:?}", self.upload_url, form.part_names());

        let resp = self
            .client
            .post(&self.upload_url)
            .multipart(form.into_multipart())
            .send()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SubmitError::Service {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let bytes = resp
            .bytes()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| SubmitError::MalformedResponse(e.to_string()))
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileSlot, SelectedFile};

    #[test]
    fn form_contains_only_selected_slots() {
        let mut selection = FileSelection::new();
        selection.insert(FileSlot::Portfolio, SelectedFile::new("portfolio.csv", b"p".to_vec()));
        selection.insert(FileSlot::Account, SelectedFile::new("account.csv", b"a".to_vec()));

        let form = UploadForm::from_selection(&selection);
        assert_eq!(form.part_names(), vec!["account", "portfolio"]);
        assert_eq!(form.parts[1].file_name, "portfolio.csv");
        assert_eq!(&form.parts[1].content[..], b"p");
    }

    #[test]
    fn empty_selection_builds_empty_form() {
        let form = UploadForm::from_selection(&FileSelection::new());
        assert!(form.parts.is_empty());
    }

    #[test]
    fn config_reads_overrides() {
        let config = ServiceConfig::from_lookup(|key| match key {
            "FOLIO_SERVICE_URL" => Some("http://analysis:9000/".to_string()),
            "FOLIO_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.upload_url(), "http://analysis:9000/upload");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn config_rejects_bad_timeout() {
        let err = ServiceConfig::from_lookup(|key| (key == "FOLIO_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_defaults_without_env() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.upload_url(), "http://localhost:8000/upload");
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate("oops", 10), "oops");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
