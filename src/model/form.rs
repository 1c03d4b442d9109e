//! Host form model: the fields a page declares, their constraints, and the
//! snapshot taken on every save attempt.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::snapshot::{ACTION_FIELD, FormSnapshot};
use super::validation::{
    ValidationError, validate_date, validate_decimal, validate_integer, validate_pattern,
    validate_required,
};

/// Value a checked single checkbox contributes, as browsers send it.
pub const CHECKED_VALUE: &str = "on";

/// How a form is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    /// Read-only retrieval; print actions open their URL without saving.
    Get,
    /// Submitting form; actions save before navigating.
    #[default]
    Post,
}

/// Input type of a field, which determines its built-in format check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Number { min: Option<i64>, max: Option<i64> },
    Decimal,
    Date,
    /// A checkbox or checkbox group; its values are the checked options.
    Checkbox,
    Hidden,
}

/// An edit applied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Replace the field's value.
    Text(String),
    /// Check or uncheck one option of a checkbox field.
    Checked { option: String, checked: bool },
}

/// A single field within a [`HostForm`].
#[derive(Debug, Clone)]
pub struct FormField {
    /// Submission name.
    pub name: String,
    pub kind: FieldKind,
    /// Whether the field must be non-empty (or, for checkboxes, checked).
    pub required: bool,
    /// Optional whole-value format constraint.
    pub pattern: Option<Regex>,
    /// Error shown next to the field, if any.
    pub error: Option<String>,
    values: Vec<String>,
}

impl FormField {
    /// Creates an optional, empty field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            pattern: None,
            error: None,
            values: Vec::new(),
        }
    }

    /// Creates a hidden field holding `value`.
    pub fn hidden(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Hidden).with_value(value)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a whole-value format constraint.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets the initial value (for checkboxes: the initially checked option).
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values = vec![value.into()];
        self
    }

    /// Returns the first value, or an empty string.
    pub fn value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    /// Returns all values (checked options for checkboxes).
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns `true` if `option` is checked.
    pub fn is_checked(&self, option: &str) -> bool {
        self.values.iter().any(|v| v == option)
    }

    fn set_text(&mut self, value: String) {
        self.values = if value.is_empty() && self.kind == FieldKind::Checkbox {
            Vec::new()
        } else {
            vec![value]
        };
    }

    fn set_checked(&mut self, option: &str, checked: bool) {
        self.values.retain(|v| v != option);
        if checked {
            self.values.push(option.to_string());
        }
    }

    /// Runs the field's built-in required/format checks.
    ///
    /// An empty optional field always passes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kind == FieldKind::Checkbox {
            if self.required && self.values.is_empty() {
                return Err(ValidationError::Required {
                    field: self.name.clone(),
                });
            }
            return Ok(());
        }

        let value = self.value();
        if value.trim().is_empty() {
            if self.required {
                validate_required(&self.name, value)?;
            }
            return Ok(());
        }

        match self.kind {
            FieldKind::Number { min, max } => {
                validate_integer(&self.name, value, min, max)?;
            }
            FieldKind::Decimal => validate_decimal(&self.name, value)?,
            FieldKind::Date => {
                validate_date(&self.name, value)?;
            }
            FieldKind::Text | FieldKind::TextArea | FieldKind::Hidden | FieldKind::Checkbox => {}
        }
        if let Some(ref pattern) = self.pattern {
            validate_pattern(&self.name, value, pattern)?;
        }
        Ok(())
    }
}

/// A form on the page, addressed by its identity.
#[derive(Debug, Clone)]
pub struct HostForm {
    id: String,
    method: FormMethod,
    fields: Vec<FormField>,
    autosave: bool,
}

impl HostForm {
    /// Creates a form with the given fields. Autosave is enabled.
    pub fn new(id: impl Into<String>, method: FormMethod, fields: Vec<FormField>) -> Self {
        Self {
            id: id.into(),
            method,
            fields,
            autosave: true,
        }
    }

    /// Enables or disables autosave for this form.
    #[must_use]
    pub fn with_autosave(mut self, enabled: bool) -> Self {
        self.autosave = enabled;
        self
    }

    /// Returns the form identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the submission method.
    pub fn method(&self) -> FormMethod {
        self.method
    }

    /// Returns `false` if the form opted out of autosave.
    pub fn autosave_enabled(&self) -> bool {
        self.autosave
    }

    /// Returns a reference to the fields.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Returns the field named `name`.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Returns the value of the field named `name`, or an empty string if absent.
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(FormField::value).unwrap_or("")
    }

    /// Returns `true` if the checkbox `name` has `option` checked.
    pub fn is_checked(&self, name: &str, option: &str) -> bool {
        self.field(name).is_some_and(|f| f.is_checked(option))
    }

    /// Applies an edit. Returns `false` if no field is named `name`.
    pub fn apply(&mut self, name: &str, value: FieldValue) -> bool {
        let Some(field) = self.field_mut(name) else {
            return false;
        };
        match value {
            FieldValue::Text(text) => field.set_text(text),
            FieldValue::Checked { option, checked } => field.set_checked(&option, checked),
        }
        true
    }

    /// Sets `name` to `value`, appending a hidden field if none exists.
    pub fn ensure_hidden(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.field_mut(name) {
            Some(field) => field.set_text(value),
            None => self.fields.push(FormField::hidden(name, value)),
        }
    }

    /// Sets a boolean field: checkboxes are checked/unchecked, anything else
    /// receives `"true"`/`"false"` (appended as hidden if missing).
    pub fn ensure_flag(&mut self, name: &str, on: bool) {
        match self.field_mut(name) {
            Some(field) if field.kind == FieldKind::Checkbox => {
                field.set_checked(CHECKED_VALUE, on);
            }
            _ => self.ensure_hidden(name, if on { "true" } else { "false" }),
        }
    }

    /// Returns `true` if every field passes its built-in checks. Does not touch errors.
    pub fn check_validity(&self) -> bool {
        self.fields.iter().all(|f| f.validate().is_ok())
    }

    /// Runs the built-in checks and attaches an error to each failing field.
    ///
    /// Returns all failures, in field order.
    pub fn report_validity(&mut self) -> Result<(), Vec<ValidationError>> {
        let mut failures = Vec::new();
        for field in &mut self.fields {
            match field.validate() {
                Ok(()) => field.error = None,
                Err(e) => {
                    field.error = Some(e.to_string());
                    failures.push(e);
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Attaches server-reported messages to matching fields.
    ///
    /// Names without a matching field are ignored.
    pub fn apply_server_errors(&mut self, field_errors: &BTreeMap<String, Vec<String>>) {
        for (name, messages) in field_errors {
            if let Some(field) = self.field_mut(name) {
                field.error = Some(messages.join(" "));
            }
        }
    }

    /// Clears all field errors.
    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    /// Returns `true` if any field has an error set.
    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    /// Values of every checked checkbox option, in field order.
    pub fn checked_selections(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Checkbox)
            .flat_map(|f| f.values.iter().map(String::as_str))
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Hidden fields with a non-empty value, as `(name, value)` pairs.
    pub fn hidden_entries(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Hidden && f.name != ACTION_FIELD)
            .map(|f| (f.name.as_str(), f.value()))
            .filter(|(_, v)| !v.is_empty())
            .collect()
    }

    /// Takes a snapshot whose action tag is the form's own `action` field, if set.
    pub fn snapshot(&self) -> FormSnapshot {
        let action = Some(self.value(ACTION_FIELD))
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        self.snapshot_with_action(action)
    }

    /// Takes a snapshot with an explicit action tag (`None` for autosave).
    pub fn snapshot_with_action(&self, action: Option<String>) -> FormSnapshot {
        let mut entries = Vec::new();
        for field in &self.fields {
            for value in &field.values {
                entries.push((field.name.as_str(), value.as_str()));
            }
        }
        FormSnapshot::new(entries, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_form() -> HostForm {
        HostForm::new(
            "treatmentForm",
            FormMethod::Post,
            vec![
                FormField::new("date", FieldKind::Date).required(),
                FormField::new(
                    "mt_percent",
                    FieldKind::Number {
                        min: Some(80),
                        max: Some(140),
                    },
                )
                .with_value("120"),
                FormField::new("safety_sleep", FieldKind::Checkbox).with_value(CHECKED_VALUE),
                FormField::new("note", FieldKind::TextArea),
            ],
        )
    }

    // --- Values ---

    #[test]
    fn value_of_missing_field_is_empty() {
        assert_eq!(make_form().value("nope"), "");
    }

    #[test]
    fn apply_text_replaces_value() {
        let mut form = make_form();
        assert!(form.apply("note", FieldValue::Text("calm".into())));
        assert_eq!(form.value("note"), "calm");
    }

    #[test]
    fn apply_to_unknown_field_returns_false() {
        let mut form = make_form();
        assert!(!form.apply("nope", FieldValue::Text("x".into())));
    }

    #[test]
    fn apply_checked_toggles_option() {
        let mut form = make_form();
        form.apply(
            "safety_sleep",
            FieldValue::Checked {
                option: CHECKED_VALUE.into(),
                checked: false,
            },
        );
        assert!(!form.is_checked("safety_sleep", CHECKED_VALUE));
        form.apply(
            "safety_sleep",
            FieldValue::Checked {
                option: CHECKED_VALUE.into(),
                checked: true,
            },
        );
        assert!(form.is_checked("safety_sleep", CHECKED_VALUE));
    }

    #[test]
    fn ensure_hidden_creates_then_updates() {
        let mut form = make_form();
        form.ensure_hidden("action", "save");
        form.ensure_hidden("action", "save_and_print");
        let actions: Vec<_> = form
            .fields()
            .iter()
            .filter(|f| f.name == "action")
            .collect();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].value(), "save_and_print");
        assert_eq!(actions[0].kind, FieldKind::Hidden);
    }

    #[test]
    fn ensure_flag_on_checkbox_and_missing_field() {
        let mut form = make_form();
        form.ensure_flag("safety_sleep", false);
        form.ensure_flag("mt_remeasured", true);
        assert!(!form.is_checked("safety_sleep", CHECKED_VALUE));
        assert_eq!(form.value("mt_remeasured"), "true");
    }

    // --- Validity ---

    #[test]
    fn check_validity_does_not_set_errors() {
        let form = make_form();
        assert!(!form.check_validity());
        assert!(!form.has_errors());
    }

    #[test]
    fn report_validity_marks_failing_fields() {
        let mut form = make_form();
        form.apply("mt_percent", FieldValue::Text("150".into()));
        let errors = form.report_validity().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(form.field("date").unwrap().error.is_some());
        assert!(form.field("mt_percent").unwrap().error.is_some());
        assert!(form.field("note").unwrap().error.is_none());
    }

    #[test]
    fn report_validity_clears_fixed_errors() {
        let mut form = make_form();
        assert!(form.report_validity().is_err());
        form.apply("date", FieldValue::Text("2025-03-01".into()));
        assert_eq!(form.report_validity(), Ok(()));
        assert!(!form.has_errors());
    }

    #[test]
    fn optional_empty_number_is_valid() {
        let kind = FieldKind::Number {
            min: Some(1),
            max: None,
        };
        let field = FormField::new("n", kind);
        assert_eq!(field.validate(), Ok(()));
    }

    #[test]
    fn required_checkbox_needs_a_checked_option() {
        let field = FormField::new("docs", FieldKind::Checkbox).required();
        assert!(field.validate().is_err());
    }

    #[test]
    fn pattern_checked_after_kind() {
        let field = FormField::new("code", FieldKind::Text)
            .with_pattern(Regex::new(r"[A-Z]{2}").unwrap())
            .with_value("abc");
        assert!(matches!(
            field.validate(),
            Err(ValidationError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn apply_server_errors_targets_named_fields() {
        let mut form = make_form();
        let mut errors = BTreeMap::new();
        errors.insert("note".to_string(), vec!["too short".to_string()]);
        errors.insert("ghost".to_string(), vec!["ignored".to_string()]);
        form.apply_server_errors(&errors);
        let note = form.field("note").unwrap();
        assert_eq!(note.error.as_deref(), Some("too short"));
        form.clear_errors();
        assert!(!form.has_errors());
    }

    // --- Snapshots ---

    #[test]
    fn snapshot_uses_action_field() {
        let mut form = make_form();
        form.ensure_hidden("action", "save");
        let snap = form.snapshot();
        assert_eq!(snap.action(), Some("save"));
        assert!(!snap.contains("action"));
        assert_eq!(snap.get("mt_percent"), Some("120"));
        assert_eq!(snap.get("safety_sleep"), Some(CHECKED_VALUE));
    }

    #[test]
    fn snapshot_with_action_none_ignores_stale_action() {
        let mut form = make_form();
        form.ensure_hidden("action", "save_and_print");
        assert_eq!(form.snapshot_with_action(None).action(), None);
    }

    #[test]
    fn unchecked_checkbox_is_absent_from_snapshot() {
        let mut form = make_form();
        form.ensure_flag("safety_sleep", false);
        assert!(!form.snapshot().contains("safety_sleep"));
    }

    #[test]
    fn snapshot_is_detached_from_later_edits() {
        let mut form = make_form();
        let snap = form.snapshot();
        form.apply("mt_percent", FieldValue::Text("100".into()));
        assert_eq!(snap.get("mt_percent"), Some("120"));
    }

    // --- Companion helpers ---

    #[test]
    fn checked_selections_and_hidden_entries() {
        let mut form = HostForm::new(
            "docsForm",
            FormMethod::Get,
            vec![
                FormField::new("docs", FieldKind::Checkbox),
                FormField::hidden("patient", "12"),
                FormField::hidden("course", ""),
                FormField::hidden("action", "print"),
            ],
        );
        form.apply(
            "docs",
            FieldValue::Checked {
                option: "admission".into(),
                checked: true,
            },
        );
        form.apply(
            "docs",
            FieldValue::Checked {
                option: "path".into(),
                checked: true,
            },
        );
        assert_eq!(form.checked_selections(), vec!["admission", "path"]);
        assert_eq!(form.hidden_entries(), vec![("patient", "12")]);
    }
}
