use tokio::sync::oneshot;

use crate::models::SelectedFile;
use crate::view::snapshot::ViewSnapshot;

/// User input delivered to the view, applied in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    JobDescriptionChanged(String),
    /// Picker change; `None` when the dialog closed with nothing chosen.
    FileChanged(Option<SelectedFile>),
    FileCleared,
    Submit,
}

#[derive(Debug)]
pub(crate) enum ViewMessage {
    Event(FormEvent),
    /// Answered with the current snapshot once no submission is in flight.
    WhenIdle(oneshot::Sender<ViewSnapshot>),
}
