use crate::model::{MT_MAX, MT_MIN};

/// A wizard step whose gate refused forward navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Step 5: a re-measured motor threshold must be a whole number in range.
    #[error("Enter a motor threshold between {} and {} (got {value:?}).", MT_MIN, MT_MAX)]
    MotorThreshold { value: String },

    /// Step 7: the delivered intensity must be entered.
    #[error("Enter the stimulation intensity (%) that was delivered.")]
    IntensityMissing,
}
