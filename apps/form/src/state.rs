use crate::models::SelectedFile;

/// Textarea height while the job description is empty.
pub const COLLAPSED_ROWS: u8 = 1;
/// Textarea height once the job description has any content.
pub const EXPANDED_ROWS: u8 = 4;

/// Everything the form holds for its mounted lifetime.
/// Owned by the view task; nothing here is shared or persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    job_description: String,
    file: Option<SelectedFile>,
    submitting: bool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Replaces the job description verbatim. No trimming, no length cap.
    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    /// Picker change. A new file replaces the old one; `None` (picker dismissed
    /// with nothing chosen) leaves no file held.
    pub fn set_file(&mut self, file: Option<SelectedFile>) {
        self.file = file;
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Drops text and file. The submission flag is left alone.
    pub fn reset_inputs(&mut self) {
        self.job_description.clear();
        self.file = None;
    }

    pub fn textarea_rows(&self) -> u8 {
        if self.job_description.is_empty() {
            COLLAPSED_ROWS
        } else {
            EXPANDED_ROWS
        }
    }
}
