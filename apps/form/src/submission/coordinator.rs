use serde::Serialize;
use tracing::{info, warn};

use crate::errors::SubmitError;
use crate::state::FormState;
use crate::submission::{SubmissionRequest, SubmitReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
}

impl SubmissionPhase {
    pub fn of(form: &FormState) -> Self {
        if form.is_submitting() {
            SubmissionPhase::Submitting
        } else {
            SubmissionPhase::Idle
        }
    }
}

/// How the last submission settled. Kept only so the view can show it;
/// the state machine itself always returns to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Succeeded { document: Option<String> },
    Failed { code: String, message: String },
}

/// Governs the single in-flight submission.
///
/// The in-progress flag itself lives on `FormState`; this type is the only
/// thing that flips it.
#[derive(Debug, Default)]
pub struct SubmissionCoordinator {
    clear_on_success: bool,
    last_outcome: Option<SubmissionOutcome>,
    accepted: u64,
}

impl SubmissionCoordinator {
    pub fn new(clear_on_success: bool) -> Self {
        Self {
            clear_on_success,
            ..Self::default()
        }
    }

    pub fn last_outcome(&self) -> Option<&SubmissionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Number of submissions accepted since mount.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Idle → Submitting. Returns the request to hand to the submitter, or
    /// `None` when a submission is already in flight.
    pub fn begin(&mut self, form: &mut FormState) -> Option<SubmissionRequest> {
        if form.is_submitting() {
            warn!("Submit ignored: a submission is already in flight");
            return None;
        }

        form.set_submitting(true);
        self.last_outcome = None;
        self.accepted += 1;

        let request = SubmissionRequest {
            job_description: form.job_description().to_string(),
            file: form.file().cloned(),
        };
        info!(
            submission = self.accepted,
            text_len = request.job_description.len(),
            file = request.file.as_ref().map(|f| f.name.as_str()).unwrap_or("<none>"),
            "Submission started"
        );
        Some(request)
    }

    /// Submitting → Idle, whatever the result. A settlement arriving while
    /// idle is ignored and returns `None`.
    pub fn settle(
        &mut self,
        form: &mut FormState,
        result: Result<SubmitReceipt, SubmitError>,
    ) -> Option<&SubmissionOutcome> {
        if !form.is_submitting() {
            warn!("Settlement ignored: no submission in flight");
            return None;
        }
        form.set_submitting(false);

        let outcome = match result {
            Ok(receipt) => {
                let document = receipt.document.as_ref().and_then(|p| {
                    p.file_name().map(|n| n.to_string_lossy().into_owned())
                });
                info!(
                    submission = self.accepted,
                    submitted_at = %receipt.submitted_at,
                    document = document.as_deref().unwrap_or("<none>"),
                    "Submission succeeded"
                );
                if self.clear_on_success {
                    form.reset_inputs();
                }
                SubmissionOutcome::Succeeded { document }
            }
            Err(e) => {
                warn!(submission = self.accepted, error = %e, "Submission failed");
                SubmissionOutcome::Failed {
                    code: e.code().to_string(),
                    message: e.user_message(),
                }
            }
        };

        Some(&*self.last_outcome.insert(outcome))
    }
}
