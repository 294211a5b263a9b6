//! API request models.

pub mod playthroughs;

pub use playthroughs::{Submission, UploadedFile};
