//! The wizard as a pure reducer: `(wizard, event) -> (wizard, effect)`.

use super::error::GateError;
use super::event::{StepEdit, WizardEvent};
use super::state::{Axis, GuidanceBoxes, WizardDefaults, WizardState};
use super::step::Step;
use super::submission::WizardSubmission;
use crate::model::parse_motor_threshold;

/// What a reduction asks of the caller, beyond re-rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    /// State may have changed; nothing else to do.
    None,
    /// Forward navigation was refused by the current step's gate.
    Blocked(GateError),
    /// The run finished; write the submission into the host form and save.
    Completed(WizardSubmission),
    /// The event does not apply in the current state.
    Ignored,
}

/// The procedure wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    open: bool,
    completed: bool,
    step: Step,
    state: Option<WizardState>,
    message: Option<String>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    /// A closed wizard. Send [`WizardEvent::Open`] to start a run.
    pub fn new() -> Self {
        Self {
            open: false,
            completed: false,
            step: Step::EquipmentPrep,
            state: None,
            message: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Answers of the current run, if one was ever opened.
    pub fn state(&self) -> Option<&WizardState> {
        self.state.as_ref()
    }

    /// Inline message from the last refused navigation.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn reduce(mut self, event: WizardEvent) -> (Self, WizardEffect) {
        let event = match event {
            WizardEvent::Open(defaults) => return (Self::opened(&defaults), WizardEffect::None),
            other => other,
        };
        if !self.open {
            return (self, WizardEffect::Ignored);
        }
        let Some(mut state) = self.state.take() else {
            return (self, WizardEffect::Ignored);
        };

        let effect = match event {
            WizardEvent::Open(_) => WizardEffect::Ignored,
            WizardEvent::Next => match self.step.next() {
                None => WizardEffect::Ignored,
                Some(next) => match self.leave(&mut state) {
                    Ok(()) => {
                        self.step = next;
                        WizardEffect::None
                    }
                    Err(e) => {
                        self.message = Some(e.to_string());
                        WizardEffect::Blocked(e)
                    }
                },
            },
            WizardEvent::Prev => match self.step.prev() {
                None => WizardEffect::Ignored,
                Some(prev) => {
                    if self.step == Step::SafetyCheck {
                        state.recompute_mt_requirement();
                    }
                    self.step = prev;
                    self.message = None;
                    WizardEffect::None
                }
            },
            WizardEvent::Complete => {
                if self.step.is_last() && !self.completed {
                    self.completed = true;
                    self.open = false;
                    WizardEffect::Completed(WizardSubmission::from_state(&state))
                } else {
                    WizardEffect::Ignored
                }
            }
            WizardEvent::Edit(edit) => {
                if edit.step() == self.step {
                    apply_edit(&mut state, edit);
                    WizardEffect::None
                } else {
                    WizardEffect::Ignored
                }
            }
            WizardEvent::Close => {
                self.open = false;
                WizardEffect::None
            }
        };

        self.state = Some(state);
        (self, effect)
    }

    /// Reopens a completed run on its last step, answers intact, when the
    /// host form refused to save it. Does nothing if the run did not complete.
    pub fn reject_completion(mut self, message: impl Into<String>) -> Self {
        if self.completed && self.state.is_some() {
            self.open = true;
            self.completed = false;
            self.step = Step::Finish;
            self.message = Some(message.into());
        }
        self
    }

    fn opened(defaults: &WizardDefaults) -> Self {
        Self {
            open: true,
            completed: false,
            step: Step::EquipmentPrep,
            state: Some(WizardState::from_defaults(defaults)),
            message: None,
        }
    }

    /// Runs the current step's gate before moving forward.
    fn leave(&mut self, state: &mut WizardState) -> Result<(), GateError> {
        match self.step {
            Step::SafetyCheck => state.recompute_mt_requirement(),
            Step::MotorThreshold if state.mt_measurement_required() => {
                if parse_motor_threshold(&state.mt.value).is_err() {
                    let value = state.mt.value.clone();
                    return Err(GateError::MotorThreshold { value });
                }
            }
            Step::Stimulation if state.stimulation.mt_percent.trim().is_empty() => {
                return Err(GateError::IntensityMissing);
            }
            _ => {}
        }
        self.message = None;
        Ok(())
    }

    /// A render-ready projection of the wizard.
    pub fn view(&self) -> WizardView {
        let state = self.state.as_ref();
        let guidance = state.and_then(|s| match self.step {
            Step::ConfirmStimulus => Some(s.confirm.report.guidance()),
            Step::Stimulation => Some(s.stimulation.report.guidance()),
            _ => None,
        });
        WizardView {
            open: self.open,
            step: self.step,
            total: Step::COUNT,
            title: self.step.title(),
            progress: f32::from(self.step.number()) / f32::from(Step::COUNT),
            show_prev: !self.step.is_first(),
            show_next: !self.step.is_last(),
            show_complete: self.step.is_last() && !self.completed,
            mt_measurement_required: state.is_some_and(WizardState::mt_measurement_required),
            guidance,
            adverse_report_enabled: state.is_some_and(|s| s.adverse.any()),
            first_session: state.is_some_and(|s| s.first_session),
            message: self.message.clone(),
        }
    }
}

fn apply_edit(state: &mut WizardState, edit: StepEdit) {
    match edit {
        StepEdit::Safety(check, value) => state.safety.set(check, value),
        StepEdit::MtDate(v) => state.mt.date = v,
        StepEdit::MtValue(v) => state.mt.value = v,
        StepEdit::MtPoint(point, axis, v) => {
            let point = state.mt.point_mut(point);
            match axis {
                Axis::X => point.x = v,
                Axis::Y => point.y = v,
            }
        }
        StepEdit::MtNote(v) => state.mt.note = v,
        StepEdit::ConfirmSeconds(v) => state.confirm.seconds = v,
        StepEdit::ConfirmPercent(v) => state.confirm.percent = v,
        StepEdit::ConfirmDiscomfort(on) => state.confirm.report.discomfort = on,
        StepEdit::ConfirmMovement(on) => state.confirm.report.movement = on,
        StepEdit::ConfirmNote(v) => state.confirm.report.note = v,
        StepEdit::StimulationPercent(v) => state.stimulation.mt_percent = v,
        StepEdit::StimulationDiscomfort(on) => state.stimulation.report.discomfort = on,
        StepEdit::StimulationMovement(on) => state.stimulation.report.movement = on,
        StepEdit::StimulationNote(v) => state.stimulation.report.note = v,
        StepEdit::AdverseEvent(event, on) => {
            if on {
                state.adverse.checked.insert(event);
            } else {
                state.adverse.checked.remove(&event);
            }
        }
        StepEdit::SideEffectOpened => state.adverse.side_effect_opened = true,
    }
}

/// What a rendering layer needs to draw the wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardView {
    pub open: bool,
    pub step: Step,
    pub total: u8,
    pub title: &'static str,
    /// Fraction of the run reached, in `(0, 1]`.
    pub progress: f32,
    pub show_prev: bool,
    pub show_next: bool,
    pub show_complete: bool,
    pub mt_measurement_required: bool,
    /// Guidance panels for steps 6 and 7.
    pub guidance: Option<GuidanceBoxes>,
    /// Adverse-event report actions are enabled.
    pub adverse_report_enabled: bool,
    pub first_session: bool,
    pub message: Option<String>,
}
