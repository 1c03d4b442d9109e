use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::model::{FormSnapshot, ValidationError};

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A short notification shown after a manual action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }

    /// Error toast listing the server's field errors, one `・field: message` line each.
    pub fn validation(field_errors: &BTreeMap<String, Vec<String>>) -> Self {
        let mut message = String::from("There are input errors.");
        for (field, messages) in field_errors {
            message.push_str(&format!("\n・{field}: {}", messages.join(", ")));
        }
        Self::error(message)
    }

    pub fn is_error(&self) -> bool {
        self.kind == ToastKind::Error
    }
}

/// The single result of a manual action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The form's own checks failed; nothing was sent. Errors are shown inline.
    Aborted {
        form_id: String,
        errors: Vec<ValidationError>,
    },
    /// Show a toast and stay on the page.
    Notified(Toast),
    /// Show a toast and open the print view in `target`.
    OpenPrintView {
        toast: Toast,
        url: Url,
        target: String,
    },
    /// Show a toast and navigate the current tab after `delay`.
    Redirect {
        toast: Toast,
        url: Url,
        delay: Duration,
    },
    /// Submit the form as a full page navigation so the server's own error
    /// page is shown.
    FullSubmit {
        form_id: String,
        snapshot: FormSnapshot,
    },
}

impl ActionOutcome {
    /// The toast to show, if any.
    pub fn toast(&self) -> Option<&Toast> {
        match self {
            Self::Notified(toast)
            | Self::OpenPrintView { toast, .. }
            | Self::Redirect { toast, .. } => Some(toast),
            Self::Aborted { .. } | Self::FullSubmit { .. } => None,
        }
    }

    /// Returns `true` if the outcome leaves the current page.
    pub fn navigates(&self) -> bool {
        matches!(self, Self::Redirect { .. } | Self::FullSubmit { .. })
    }
}
