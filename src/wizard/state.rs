//! Answers collected by the wizard.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{CHECKED_VALUE, HostForm};

/// Intensity used for step 7 when the host form has none.
pub const DEFAULT_MT_PERCENT: &str = "120";

/// The three pre-treatment safety checks. `true` means "no concern".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyChecks {
    /// No lack of sleep.
    pub sleep: bool,
    /// No excess alcohol or caffeine.
    pub alcohol: bool,
    /// No change in medication.
    pub meds: bool,
}

impl Default for SafetyChecks {
    fn default() -> Self {
        Self {
            sleep: true,
            alcohol: true,
            meds: true,
        }
    }
}

impl SafetyChecks {
    /// A motor threshold re-measurement is needed if any check is cleared.
    pub fn requires_mt_measurement(self) -> bool {
        !self.sleep || !self.alcohol || !self.meds
    }

    pub fn get(self, check: SafetyCheck) -> bool {
        match check {
            SafetyCheck::Sleep => self.sleep,
            SafetyCheck::Alcohol => self.alcohol,
            SafetyCheck::Meds => self.meds,
        }
    }

    pub fn set(&mut self, check: SafetyCheck, value: bool) {
        match check {
            SafetyCheck::Sleep => self.sleep = value,
            SafetyCheck::Alcohol => self.alcohol = value,
            SafetyCheck::Meds => self.meds = value,
        }
    }
}

/// Names one of the [`SafetyChecks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyCheck {
    Sleep,
    Alcohol,
    Meds,
}

impl SafetyCheck {
    pub const ALL: [SafetyCheck; 3] = [Self::Sleep, Self::Alcohol, Self::Meds];

    /// Host form field holding this check.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Sleep => "safety_sleep",
            Self::Alcohol => "safety_alcohol",
            Self::Meds => "safety_meds",
        }
    }
}

/// A coordinate on the positioning grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPoint {
    pub x: String,
    pub y: String,
}

impl GridPoint {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Which of the two grid points an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointId {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Step 5: motor threshold re-measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtMeasurement {
    /// Measurement date, `YYYY-MM-DD`.
    pub date: String,
    pub value: String,
    pub point_a: GridPoint,
    pub point_b: GridPoint,
    pub note: String,
}

impl MtMeasurement {
    fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            value: "60".to_string(),
            point_a: GridPoint::new("3", "1"),
            point_b: GridPoint::new("9", "1"),
            note: String::new(),
        }
    }

    pub fn point_mut(&mut self, point: PointId) -> &mut GridPoint {
        match point {
            PointId::A => &mut self.point_a,
            PointId::B => &mut self.point_b,
        }
    }
}

/// Patient reaction to a stimulus, reported on steps 6 and 7.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StimulusReport {
    /// Excessive discomfort.
    pub discomfort: bool,
    /// Involuntary movement.
    pub movement: bool,
    pub note: String,
}

impl StimulusReport {
    pub fn guidance(&self) -> GuidanceBoxes {
        GuidanceBoxes {
            default: !self.discomfort && !self.movement,
            discomfort: self.discomfort,
            movement: self.movement,
        }
    }
}

/// Which guidance panels a stimulus step shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidanceBoxes {
    /// Shown when no reaction was reported.
    pub default: bool,
    pub discomfort: bool,
    pub movement: bool,
}

/// Step 6: confirmation stimulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmStimulus {
    /// Train duration in seconds.
    pub seconds: String,
    /// Intensity in %MT.
    pub percent: String,
    pub report: StimulusReport,
}

impl Default for ConfirmStimulus {
    fn default() -> Self {
        Self {
            seconds: "2.0".to_string(),
            percent: "120".to_string(),
            report: StimulusReport::default(),
        }
    }
}

/// Step 7: the treatment stimulation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stimulation {
    /// Delivered intensity in %MT.
    pub mt_percent: String,
    pub report: StimulusReport,
}

/// Adverse events checked on step 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdverseEvent {
    Seizure,
    FingerMuscle,
    Syncope,
    Mania,
    SuicideAttempt,
    Other,
}

impl AdverseEvent {
    pub const ALL: [AdverseEvent; 6] = [
        Self::Seizure,
        Self::FingerMuscle,
        Self::Syncope,
        Self::Mania,
        Self::SuicideAttempt,
        Self::Other,
    ];

    /// Host form field holding this event.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Seizure => "sae_seizure",
            Self::FingerMuscle => "sae_finger_muscle",
            Self::Syncope => "sae_syncope",
            Self::Mania => "sae_mania",
            Self::SuicideAttempt => "sae_suicide_attempt",
            Self::Other => "sae_other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Seizure => "Seizure",
            Self::FingerMuscle => "Finger muscle contraction",
            Self::Syncope => "Syncope",
            Self::Mania => "Mania or hypomania",
            Self::SuicideAttempt => "Suicide attempt",
            Self::Other => "Other",
        }
    }
}

/// Step 8: side effects and adverse events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdverseEvents {
    pub checked: BTreeSet<AdverseEvent>,
    /// Whether the side-effect panel was opened during this run.
    pub side_effect_opened: bool,
}

impl AdverseEvents {
    /// Report actions are enabled once any event is checked.
    pub fn any(&self) -> bool {
        !self.checked.is_empty()
    }

    pub fn is_checked(&self, event: AdverseEvent) -> bool {
        self.checked.contains(&event)
    }
}

/// Values the wizard starts from each time it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDefaults {
    pub today: NaiveDate,
    /// Last known stimulation intensity, if any.
    pub mt_percent: Option<String>,
    pub safety: SafetyChecks,
    pub adverse: BTreeSet<AdverseEvent>,
    /// First session of the patient's course; changes step 2's instructions.
    pub first_session: bool,
}

impl WizardDefaults {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            mt_percent: None,
            safety: SafetyChecks::default(),
            adverse: BTreeSet::new(),
            first_session: false,
        }
    }

    /// Reads defaults from the host form's current values.
    ///
    /// Safety checks missing from the form default to checked.
    pub fn from_host_form(form: &HostForm, today: NaiveDate, first_session: bool) -> Self {
        let mut safety = SafetyChecks::default();
        for check in SafetyCheck::ALL {
            if form.field(check.field_name()).is_some() {
                safety.set(check, form.is_checked(check.field_name(), CHECKED_VALUE));
            }
        }
        let adverse = AdverseEvent::ALL
            .into_iter()
            .filter(|e| form.is_checked(e.field_name(), CHECKED_VALUE))
            .collect();
        Self {
            today,
            mt_percent: Some(form.value("mt_percent").trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            safety,
            adverse,
            first_session,
        }
    }
}

/// Everything the wizard has collected during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub safety: SafetyChecks,
    mt_measurement_required: bool,
    pub mt: MtMeasurement,
    pub confirm: ConfirmStimulus,
    pub stimulation: Stimulation,
    pub adverse: AdverseEvents,
    pub first_session: bool,
}

impl WizardState {
    pub fn from_defaults(defaults: &WizardDefaults) -> Self {
        let mut state = Self {
            safety: defaults.safety,
            mt_measurement_required: false,
            mt: MtMeasurement::new(defaults.today),
            confirm: ConfirmStimulus::default(),
            stimulation: Stimulation {
                mt_percent: defaults
                    .mt_percent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MT_PERCENT.to_string()),
                report: StimulusReport::default(),
            },
            adverse: AdverseEvents {
                checked: defaults.adverse.clone(),
                side_effect_opened: false,
            },
            first_session: defaults.first_session,
        };
        state.recompute_mt_requirement();
        state
    }

    /// Whether step 5 requires a re-measured motor threshold.
    ///
    /// Derived from the safety checks as they were when step 3 was last left.
    pub fn mt_measurement_required(&self) -> bool {
        self.mt_measurement_required
    }

    pub(crate) fn recompute_mt_requirement(&mut self) {
        self.mt_measurement_required = self.safety.requires_mt_measurement();
    }
}
