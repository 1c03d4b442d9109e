use crate::actions::UserAction;
use crate::model::{ACTION_FIELD, FormSnapshot, HostForm};

use super::state::{AdverseEvent, SafetyCheck, StimulusReport, WizardState};

/// A value written into the host form on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionValue {
    Text(String),
    Flag(bool),
}

/// The consolidated answers of one completed wizard run, keyed by host form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSubmission {
    entries: Vec<(&'static str, SubmissionValue)>,
}

impl WizardSubmission {
    pub(crate) fn from_state(state: &WizardState) -> Self {
        use SubmissionValue::{Flag, Text};

        let mut entries = Vec::new();
        for check in SafetyCheck::ALL {
            entries.push((check.field_name(), Flag(state.safety.get(check))));
        }

        let remeasured = state.mt_measurement_required();
        let mt = &state.mt;
        entries.push(("mt_remeasured", Flag(remeasured)));
        if remeasured {
            entries.push(("motor_threshold", Text(mt.value.trim().to_string())));
        }
        entries.extend([
            ("wizard_mt_date", Text(mt.date.clone())),
            ("wizard_mt_value", Text(mt.value.clone())),
            ("wizard_mt_point_a_x", Text(mt.point_a.x.clone())),
            ("wizard_mt_point_a_y", Text(mt.point_a.y.clone())),
            ("wizard_mt_point_b_x", Text(mt.point_b.x.clone())),
            ("wizard_mt_point_b_y", Text(mt.point_b.y.clone())),
            ("wizard_mt_note", Text(mt.note.clone())),
        ]);

        entries.extend([
            ("wizard_trial_seconds", Text(state.confirm.seconds.clone())),
            ("wizard_trial_percent", Text(state.confirm.percent.clone())),
        ]);
        push_report(&mut entries, TRIAL_FIELDS, &state.confirm.report);

        entries.push((
            "mt_percent",
            Text(state.stimulation.mt_percent.trim().to_string()),
        ));
        push_report(&mut entries, STIM_FIELDS, &state.stimulation.report);

        for event in AdverseEvent::ALL {
            entries.push((event.field_name(), Flag(state.adverse.is_checked(event))));
        }
        entries.push((
            "wizard_side_effect_opened",
            Flag(state.adverse.side_effect_opened),
        ));

        Self { entries }
    }

    pub fn entries(&self) -> &[(&'static str, SubmissionValue)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&SubmissionValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Writes every answer into `form`, creating hidden fields as needed, and
    /// marks the form's `action` for a wizard save.
    pub fn apply_to(&self, form: &mut HostForm) {
        for (name, value) in &self.entries {
            match value {
                SubmissionValue::Text(text) => form.ensure_hidden(name, text.as_str()),
                SubmissionValue::Flag(on) => form.ensure_flag(name, *on),
            }
        }
        form.ensure_hidden(ACTION_FIELD, UserAction::SaveFromWizard.as_str());
    }

    /// The answers alone as a snapshot, flags as `"true"`/`"false"`.
    pub fn to_snapshot(&self) -> FormSnapshot {
        let entries = self.entries.iter().map(|(name, value)| {
            let value = match value {
                SubmissionValue::Text(text) => text.clone(),
                SubmissionValue::Flag(on) => on.to_string(),
            };
            (*name, value)
        });
        FormSnapshot::new(
            entries,
            Some(UserAction::SaveFromWizard.as_str().to_string()),
        )
    }
}

/// Reaction fields of a stimulus step, as `[discomfort, movement, note]`.
const TRIAL_FIELDS: [&str; 3] = [
    "wizard_trial_discomfort",
    "wizard_trial_movement",
    "wizard_trial_note",
];
const STIM_FIELDS: [&str; 3] = [
    "wizard_stim_discomfort",
    "wizard_stim_movement",
    "wizard_stim_note",
];

fn push_report(
    entries: &mut Vec<(&'static str, SubmissionValue)>,
    [discomfort, movement, note]: [&'static str; 3],
    report: &StimulusReport,
) {
    entries.extend([
        (discomfort, SubmissionValue::Flag(report.discomfort)),
        (movement, SubmissionValue::Flag(report.movement)),
        (note, SubmissionValue::Text(report.note.clone())),
    ]);
}
