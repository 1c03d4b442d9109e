use std::fmt;

use serde::{Deserialize, Serialize};

/// A button-triggered action, sent to the server as the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    #[default]
    Save,
    SaveAndPrint,
    SaveAndComplete,
    /// Consolidated save issued when the procedure wizard completes.
    SaveFromWizard,
}

impl UserAction {
    /// Wire value of the `action` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::SaveAndPrint => "save_and_print",
            Self::SaveAndComplete => "save_and_complete",
            Self::SaveFromWizard => "save_from_wizard",
        }
    }

    /// Returns `true` if the action ends by opening a print view.
    pub fn is_print(self) -> bool {
        self == Self::SaveAndPrint
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_target() -> String {
    "_blank".to_string()
}

/// Configuration a page declares on an action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub action: UserAction,
    /// Identity of the form the button saves.
    pub form_id: String,
    /// Base URL of the print view, if the button prints.
    #[serde(default)]
    pub print_url: Option<String>,
    /// Companion form whose selections feed the print URL.
    #[serde(default)]
    pub docs_form_id: Option<String>,
    /// Window the print view opens in.
    #[serde(default = "default_target")]
    pub target: String,
}

impl ButtonConfig {
    pub fn new(action: UserAction, form_id: impl Into<String>) -> Self {
        Self {
            action,
            form_id: form_id.into(),
            print_url: None,
            docs_form_id: None,
            target: default_target(),
        }
    }

    #[must_use]
    pub fn with_print_url(mut self, url: impl Into<String>) -> Self {
        self.print_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_docs_form(mut self, form_id: impl Into<String>) -> Self {
        self.docs_form_id = Some(form_id.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }
}
