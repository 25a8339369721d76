use bytes::Bytes;
use serde::Serialize;

/// The only extension the file picker offers, compared case-insensitively.
pub const ACCEPTED_EXTENSION: &str = "tex";

/// A file chosen through the picker. Cheap to clone: the content is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Metadata-only view of a selected file, safe to log and render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: usize,
}

impl From<&SelectedFile> for FileSummary {
    fn from(file: &SelectedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_bytes: file.size(),
        }
    }
}

/// True when `file_name` carries the accepted extension.
/// A name without a dot never matches, and neither does a bare `tex`.
pub fn has_accepted_extension(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION),
        None => false,
    }
}
