use serde::Serialize;

/// Name of the field that identifies which button triggered a save.
pub const ACTION_FIELD: &str = "action";

/// An immutable copy of a form's field values at one instant.
///
/// Entries keep document order and may repeat a name (multi-valued fields
/// such as checkbox groups). The `action` tag is held apart from the entries
/// and always emitted last on the wire. A snapshot is never patched: helpers
/// such as [`with_entry`](Self::with_entry) return a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormSnapshot {
    entries: Vec<(String, String)>,
    action: Option<String>,
}

impl FormSnapshot {
    /// Creates a snapshot from ordered entries.
    ///
    /// Any entry named [`ACTION_FIELD`] is dropped; the action travels in
    /// `action` instead so it appears exactly once.
    pub fn new<I, K, V>(entries: I, action: Option<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k != ACTION_FIELD)
            .collect();
        Self { entries, action }
    }

    /// Returns the ordered field entries, excluding the action tag.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Returns the action tag, if any.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns the first value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value recorded for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns `true` if at least one entry is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Returns a new snapshot with one more entry appended.
    #[must_use]
    pub fn with_entry(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.push((name.into(), value.into()));
        Self::new(entries, self.action.clone())
    }

    /// Returns a new snapshot carrying `action` as its action tag.
    #[must_use]
    pub fn with_action(&self, action: Option<String>) -> Self {
        Self {
            entries: self.entries.clone(),
            action,
        }
    }

    /// Entries as sent on the wire: all fields, then `action` (empty for autosave).
    pub fn wire_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        let action = self.action.as_deref().unwrap_or("");
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once((ACTION_FIELD, action)))
    }
}
