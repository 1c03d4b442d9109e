//! Autosave status indicator.

use std::fmt;

/// What the per-form status indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutosaveStatus {
    /// Nothing to report; the indicator is blank.
    #[default]
    Idle,
    /// A save is in flight.
    Saving,
    /// The last save succeeded. Reverts to `Idle` after the display window.
    Saved,
    /// The last save failed. Stays until the next success or a dismissal.
    Failed,
}

impl AutosaveStatus {
    /// Short text for the indicator. Empty when idle.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Saving => "Saving…",
            Self::Saved => "✓ Saved",
            Self::Failed => "Save failed",
        }
    }

    /// Returns `true` if the indicator shows something.
    pub fn is_visible(self) -> bool {
        self != Self::Idle
    }
}

impl fmt::Display for AutosaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
