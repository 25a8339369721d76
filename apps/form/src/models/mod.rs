pub mod bubble;
pub mod file;

pub use bubble::{Bubble, BubbleBounds};
pub use file::{has_accepted_extension, FileSummary, SelectedFile};
