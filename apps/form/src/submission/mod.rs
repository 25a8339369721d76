//! Submission: the in-flight state machine and the pluggable collaborators it
//! hands the form to.
//!
//! The view holds an `Arc<dyn Submitter>` chosen at startup from config.
//! `SimulatedSubmitter` is the fixed-delay stand-in; `HttpSubmitter` posts to
//! the resume service.

pub mod coordinator;
pub mod http;
pub mod simulated;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::SubmitError;
use crate::models::SelectedFile;

pub use coordinator::{SubmissionCoordinator, SubmissionOutcome, SubmissionPhase};
pub use http::HttpSubmitter;
pub use simulated::SimulatedSubmitter;

/// An owned copy of the form taken when a submit is accepted.
/// Later edits to the form do not change what is being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub job_description: String,
    pub file: Option<SelectedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub submitted_at: DateTime<Utc>,
    /// Where the returned document was saved, if the collaborator returned one.
    pub document: Option<PathBuf>,
}

/// The single operation the form uses to hand itself off.
///
/// Called once per accepted submit; the returned future is awaited exactly once.
/// Implement this to swap backends without touching the view.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmitReceipt, SubmitError>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}
