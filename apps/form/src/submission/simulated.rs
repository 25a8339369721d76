use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::errors::SubmitError;
use crate::submission::{SubmissionRequest, SubmitReceipt, Submitter};

/// Stand-in for the resume service: logs what would be sent, waits a fixed
/// delay, then always succeeds without returning a document.
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmitReceipt, SubmitError> {
        tokio::time::sleep(self.delay).await;

        info!("Job Description: {:?}", request.job_description);
        match &request.file {
            Some(file) => info!("File: {} ({} bytes)", file.name, file.size()),
            None => info!("File: <none>"),
        }

        Ok(SubmitReceipt {
            submitted_at: Utc::now(),
            document: None,
        })
    }

    fn backend(&self) -> &'static str {
        "simulated"
    }
}
