//! The nine-step procedure wizard.
//!
//! The wizard is a pure reducer over [`WizardEvent`]s. It never talks to the
//! server: on completion it hands back a [`WizardSubmission`] that the caller
//! writes into the host form before saving it through the normal path.

mod error;
mod event;
mod reducer;
mod state;
mod step;
mod submission;

pub use error::GateError;
pub use event::{StepEdit, WizardEvent};
pub use reducer::{Wizard, WizardEffect, WizardView};
pub use state::{
    AdverseEvent, AdverseEvents, Axis, ConfirmStimulus, DEFAULT_MT_PERCENT, GridPoint,
    GuidanceBoxes, MtMeasurement, PointId, SafetyCheck, SafetyChecks, Stimulation,
    StimulusReport, WizardDefaults, WizardState,
};
pub use step::Step;
pub use submission::{SubmissionValue, WizardSubmission};
