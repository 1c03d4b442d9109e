use std::fmt;

/// One step of the procedure wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    EquipmentPrep,
    SoftwarePrep,
    SafetyCheck,
    HeadCap,
    MotorThreshold,
    ConfirmStimulus,
    Stimulation,
    AdverseEvents,
    Finish,
}

impl Step {
    /// Number of steps.
    pub const COUNT: u8 = 9;

    /// All steps, in order.
    pub const ALL: [Step; 9] = [
        Step::EquipmentPrep,
        Step::SoftwarePrep,
        Step::SafetyCheck,
        Step::HeadCap,
        Step::MotorThreshold,
        Step::ConfirmStimulus,
        Step::Stimulation,
        Step::AdverseEvents,
        Step::Finish,
    ];

    /// 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            Self::EquipmentPrep => 1,
            Self::SoftwarePrep => 2,
            Self::SafetyCheck => 3,
            Self::HeadCap => 4,
            Self::MotorThreshold => 5,
            Self::ConfirmStimulus => 6,
            Self::Stimulation => 7,
            Self::AdverseEvents => 8,
            Self::Finish => 9,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// The following step, or `None` on the last one.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// The preceding step, or `None` on the first one.
    pub fn prev(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub fn is_first(self) -> bool {
        self == Self::EquipmentPrep
    }

    pub fn is_last(self) -> bool {
        self == Self::Finish
    }

    /// Steps that only show instructions and hold no answers.
    pub fn is_informational(self) -> bool {
        matches!(
            self,
            Self::EquipmentPrep | Self::SoftwarePrep | Self::HeadCap | Self::Finish
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::EquipmentPrep => "Prepare the equipment",
            Self::SoftwarePrep => "Prepare the software",
            Self::SafetyCheck => "Prepare the patient (safety check)",
            Self::HeadCap => "Fit the head cap and grid",
            Self::MotorThreshold => "Motor threshold",
            Self::ConfirmStimulus => "Confirmation stimulus",
            Self::Stimulation => "Treatment stimulation",
            Self::AdverseEvents => "Side effects and adverse events",
            Self::Finish => "Finish",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for step in Step::ALL {
            assert_eq!(Step::from_number(step.number()), Some(step));
        }
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(10), None);
    }

    #[test]
    fn ends_have_no_neighbor() {
        assert_eq!(Step::EquipmentPrep.prev(), None);
        assert_eq!(Step::Finish.next(), None);
        assert_eq!(Step::SafetyCheck.next(), Some(Step::HeadCap));
        assert_eq!(Step::SafetyCheck.prev(), Some(Step::SoftwarePrep));
    }

    #[test]
    fn informational_steps() {
        let info: Vec<u8> = Step::ALL
            .iter()
            .filter(|s| s.is_informational())
            .map(|s| s.number())
            .collect();
        assert_eq!(info, vec![1, 2, 4, 9]);
    }

    #[test]
    fn display() {
        assert_eq!(Step::MotorThreshold.to_string(), "Step 5: Motor threshold");
    }
}
