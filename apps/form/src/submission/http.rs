//! HTTP submitter: the only place the form talks to the resume service.
//!
//! Sends the form as `multipart/form-data` (`job_description` text plus the
//! `file` part) and saves the PDF the service answers with. Non-2xx answers
//! carry `{"error": "..."}`, surfaced verbatim as a rejection.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::SubmitError;
use crate::submission::{SubmissionRequest, SubmitReceipt, Submitter};

/// Name used when the service does not suggest one.
pub const DEFAULT_DOCUMENT_NAME: &str = "resume.pdf";
const TEX_MIME: &str = "application/x-tex";

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: String,
}

#[derive(Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
    timeout: Duration,
    download_dir: PathBuf,
}

impl HttpSubmitter {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self, SubmitError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
            timeout,
            download_dir: download_dir.into(),
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> SubmitError {
        if e.is_timeout() {
            SubmitError::TimedOut(self.timeout)
        } else {
            SubmitError::Http(e)
        }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmitReceipt, SubmitError> {
        let mut form = Form::new().text("job_description", request.job_description);
        if let Some(file) = request.file {
            let part = Part::bytes(file.content.to_vec())
                .file_name(file.name)
                .mime_str(TEX_MIME)?;
            form = form.part("file", part);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Resume service returned {}: {}", status, body);
            let message = serde_json::from_str::<ServiceError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            let message = if message.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Submission failed")
                    .to_string()
            } else {
                message
            };
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let name = attachment_name(response.headers())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!("Resume service returned {} bytes as {}", body.len(), name);

        let path = save_document(&self.download_dir, &name, body).await?;

        Ok(SubmitReceipt {
            submitted_at: Utc::now(),
            document: Some(path),
        })
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

/// Pulls the suggested file name out of `Content-Disposition`.
/// Only the final path component is kept.
fn attachment_name(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    let raw = value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))?
        .trim_matches('"');
    let name = Path::new(raw).file_name()?.to_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Writes the document through a temp file in the same directory, then
/// renames it into place so a reader never sees a partial file.
async fn save_document(dir: &Path, name: &str, body: Bytes) -> Result<PathBuf, SubmitError> {
    let dir = dir.to_path_buf();
    let dest = dir.join(name);

    let saved = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        Ok(dest)
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

    Ok(saved)
}
