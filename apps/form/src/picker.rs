use std::path::Path;

use tracing::debug;

use crate::errors::PickError;
use crate::models::{has_accepted_extension, SelectedFile};

/// Stand-in for the platform file dialog: one path per interaction, filtered on `.tex`.
/// The filter looks at the name only; content is never inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePicker;

impl FilePicker {
    /// Loads the file at `path`. A blank path means the dialog was dismissed
    /// and yields `Ok(None)`.
    pub async fn pick(&self, path: &str) -> Result<Option<SelectedFile>, PickError> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }

        let path = Path::new(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !has_accepted_extension(&name) {
            return Err(PickError::UnsupportedExtension(name));
        }

        let content = tokio::fs::read(path).await.map_err(|source| PickError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Picked {} ({} bytes)", name, content.len());

        Ok(Some(SelectedFile::new(name, content)))
    }
}
