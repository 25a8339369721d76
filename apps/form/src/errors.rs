use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why a submission settled as a failure.
/// The view turns this into a status banner; the form is never torn down over it.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Rejected by server (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Submission timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Failed to save returned document: {0}")]
    Io(#[from] std::io::Error),
}

impl SubmitError {
    /// Short machine-readable code carried in the rendered status banner.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::Rejected { .. } => "REJECTED",
            SubmitError::Http(_) => "NETWORK_ERROR",
            SubmitError::TimedOut(_) => "TIMEOUT",
            SubmitError::Io(_) => "SAVE_ERROR",
        }
    }

    /// Text shown to the user. Transport and I/O details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Rejected { message, .. } => message.clone(),
            SubmitError::Http(e) => {
                tracing::error!("Submission transport error: {e}");
                "Could not reach the resume service".to_string()
            }
            SubmitError::TimedOut(after) => {
                format!("The resume service did not answer within {}s", after.as_secs())
            }
            SubmitError::Io(e) => {
                tracing::error!("Saving returned document failed: {e}");
                "The tailored resume could not be saved".to_string()
            }
        }
    }
}

/// File picker failures. Only the extension filter and reading the file can fail.
#[derive(Debug, Error)]
pub enum PickError {
    #[error("Unsupported file '{0}': only .tex files can be selected")]
    UnsupportedExtension(String),

    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Form view is no longer mounted")]
    Unmounted,

    #[error("Form view task failed: {0}")]
    TaskFailed(String),
}
