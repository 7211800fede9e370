//! HTTP submission of report images to the analysis service.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::report::AnalysisReport;
use super::validator::UploadCandidate;
use crate::utils::format_size;

/// Default analysis endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/analyze-report";

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Detail used when an error response carries no usable `detail`.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Where a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The service answered with an error status or an unusable body.
    Server,
    /// The request was sent but no response arrived.
    Network,
    /// The request could not be built; nothing was sent.
    Request,
}

/// A request that did not yield a report.
///
/// `http_status` is `None` when no response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.kind, .http_status, .detail))]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub http_status: Option<u16>,
    pub detail: String,
}

fn describe(kind: &TransportErrorKind, http_status: &Option<u16>, detail: &str) -> String {
    match (kind, http_status) {
        (TransportErrorKind::Request, _) => format!("Request error: {}", detail),
        (_, Some(code)) => format!("Server error: {} - {}", code, detail),
        (_, None) => format!("Network error: {}", detail),
    }
}

impl TransportError {
    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Server,
            http_status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Network,
            http_status: None,
            detail: detail.into(),
        }
    }

    pub fn request(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Request,
            http_status: None,
            detail: detail.into(),
        }
    }
}

/// Sends one validated file to the analysis service.
///
/// Implementations do not queue or deduplicate; keeping a single request in
/// flight is the caller's job.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn submit(&self, candidate: UploadCandidate) -> Result<AnalysisReport, TransportError>;
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// Full URL of the analysis endpoint.
    pub endpoint: String,
    /// Sent as a bearer token when set.
    pub api_token: Option<String>,
    /// Request timeout. `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout: None,
            user_agent: format!("medportal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Multipart POST transport backed by reqwest. No retries.
pub struct HttpTransport {
    config: TransportConfig,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build_form(candidate: &UploadCandidate) -> Result<Form, TransportError> {
        let part = file_part(candidate.name(), candidate.mime_type(), candidate.content())?;
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn submit(&self, candidate: UploadCandidate) -> Result<AnalysisReport, TransportError> {
        debug!(
            "Submitting {} ({}, {}) to {}",
            candidate.name(),
            candidate.mime_type(),
            format_size(candidate.size_bytes()),
            self.config.endpoint
        );

        let form = Self::build_form(&candidate)?;
        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(ref token) = self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Analysis request for {} failed: {}", candidate.name(), e);
            TransportError::network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let detail = error_detail(&body);
            warn!(
                "Analysis service rejected {}: HTTP {} - {}",
                candidate.name(),
                status.as_u16(),
                detail
            );
            return Err(TransportError::http(status.as_u16(), detail));
        }

        let body = response.bytes().await.map_err(|e| {
            TransportError::http(status.as_u16(), format!("Failed to read response body: {}", e))
        })?;
        let report: AnalysisReport = serde_json::from_slice(&body).map_err(|e| {
            warn!("Undecodable analysis response for {}: {}", candidate.name(), e);
            TransportError::http(status.as_u16(), format!("Invalid response body: {}", e))
        })?;

        info!(
            "Analysis response for {}: status={}",
            candidate.name(),
            report.status.as_deref().unwrap_or("<missing>")
        );
        Ok(report)
    }
}

/// Streamed multipart part for one file. Fails before anything is sent.
fn file_part(name: &str, mime_type: &str, content: Bytes) -> Result<Part, TransportError> {
    let len = content.len() as u64;
    Part::stream_with_length(Body::from(content), len)
        .file_name(name.to_string())
        .mime_str(mime_type)
        .map_err(|e| {
            TransportError::request(format!("Invalid MIME type {:?}: {}", mime_type, e))
        })
}

/// Pull a human-readable message out of an error response body.
///
/// Uses `detail` when it is a string; a structured `detail` (validation
/// error lists) is shown as JSON. Anything else is "Unknown error".
pub fn error_detail(body: &[u8]) -> String {
    let parsed: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return UNKNOWN_ERROR.to_string(),
    };

    match parsed.get("detail") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}
