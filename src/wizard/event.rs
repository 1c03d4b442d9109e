use super::state::{AdverseEvent, Axis, PointId, SafetyCheck, WizardDefaults};
use super::step::Step;

/// An input to the wizard reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// (Re)open the wizard at step 1 with fresh state.
    Open(WizardDefaults),
    Next,
    Prev,
    /// Finish the run. Only accepted on the last step.
    Complete,
    Edit(StepEdit),
    Close,
}

/// A change to one answer. Each edit belongs to exactly one step and is
/// ignored unless that step is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEdit {
    Safety(SafetyCheck, bool),
    MtDate(String),
    MtValue(String),
    MtPoint(PointId, Axis, String),
    MtNote(String),
    ConfirmSeconds(String),
    ConfirmPercent(String),
    ConfirmDiscomfort(bool),
    ConfirmMovement(bool),
    ConfirmNote(String),
    StimulationPercent(String),
    StimulationDiscomfort(bool),
    StimulationMovement(bool),
    StimulationNote(String),
    AdverseEvent(AdverseEvent, bool),
    /// The side-effect panel was opened from step 8.
    SideEffectOpened,
}

impl StepEdit {
    /// The step this edit belongs to.
    pub fn step(&self) -> Step {
        match self {
            Self::Safety(..) => Step::SafetyCheck,
            Self::MtDate(_) | Self::MtValue(_) | Self::MtPoint(..) | Self::MtNote(_) => {
                Step::MotorThreshold
            }
            Self::ConfirmSeconds(_)
            | Self::ConfirmPercent(_)
            | Self::ConfirmDiscomfort(_)
            | Self::ConfirmMovement(_)
            | Self::ConfirmNote(_) => Step::ConfirmStimulus,
            Self::StimulationPercent(_)
            | Self::StimulationDiscomfort(_)
            | Self::StimulationMovement(_)
            | Self::StimulationNote(_) => Step::Stimulation,
            Self::AdverseEvent(..) | Self::SideEffectOpened => Step::AdverseEvents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edit_targets_an_informational_step() {
        let edits = [
            StepEdit::Safety(SafetyCheck::Meds, false),
            StepEdit::MtPoint(PointId::B, Axis::Y, "2".into()),
            StepEdit::ConfirmNote(String::new()),
            StepEdit::StimulationPercent("110".into()),
            StepEdit::SideEffectOpened,
        ];
        assert!(edits.iter().all(|e| !e.step().is_informational()));
    }
}
