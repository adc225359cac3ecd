//! Session model and progress statistics

pub mod stats;
pub mod types;

pub use stats::{ProgressStats, TrendPoint};
pub use types::{OwnerId, SessionDraft, SessionKind, SessionOutcome, SessionRecord};
