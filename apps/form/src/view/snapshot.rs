use serde::Serialize;
use uuid::Uuid;

use crate::models::{Bubble, FileSummary};
use crate::state::FormState;
use crate::submission::{SubmissionCoordinator, SubmissionOutcome};

pub const DROP_HINT: &str = "Drag and drop your file here, or click to select";
pub const SUBMIT_LABEL: &str = "Submit";
pub const SUBMITTING_LABEL: &str = "Submitting...";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitButton {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleView {
    pub id: Uuid,
    pub left_pct: f32,
    pub top_pct: f32,
    pub size_px: f32,
}

impl From<&Bubble> for BubbleView {
    fn from(bubble: &Bubble) -> Self {
        Self {
            id: bubble.id,
            left_pct: bubble.x_pct,
            top_pct: bubble.y_pct,
            size_px: bubble.size_px,
        }
    }
}

/// One rendered frame of the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub job_description: String,
    pub textarea_rows: u8,
    /// Shown only while no file is held.
    pub drop_hint: Option<&'static str>,
    /// Shown only while a file is held.
    pub file_chip: Option<FileSummary>,
    pub submit_button: SubmitButton,
    pub status: Option<SubmissionOutcome>,
    pub bubbles: Vec<BubbleView>,
}

impl ViewSnapshot {
    pub fn render(
        form: &FormState,
        coordinator: &SubmissionCoordinator,
        bubbles: &[Bubble],
    ) -> Self {
        let file_chip = form.file().map(FileSummary::from);
        let submitting = form.is_submitting();

        Self {
            job_description: form.job_description().to_string(),
            textarea_rows: form.textarea_rows(),
            drop_hint: file_chip.is_none().then_some(DROP_HINT),
            file_chip,
            submit_button: SubmitButton {
                label: if submitting { SUBMITTING_LABEL } else { SUBMIT_LABEL },
                disabled: submitting,
            },
            status: coordinator.last_outcome().cloned(),
            bubbles: bubbles.iter().map(BubbleView::from).collect(),
        }
    }
}
