//! User-initiated button actions: save, save-and-print, save-and-complete.

mod action;
mod dispatcher;
mod error;
mod outcome;
mod print_url;

pub use action::{ButtonConfig, UserAction};
pub use dispatcher::{ActionDispatcher, PendingAction, Prepared};
pub use error::PrintUrlError;
pub use outcome::{ActionOutcome, Toast, ToastKind};
pub use print_url::{DOCS_PARAM, PrintUrlBuilder, RETURN_TO_PARAM};
