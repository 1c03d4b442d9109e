//! Background saving driven by input changes.

mod scheduler;
mod status;

pub use scheduler::{AutosaveEntry, AutosaveScheduler, SkipReason};
pub use status::AutosaveStatus;
