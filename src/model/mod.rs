mod form;
mod snapshot;
mod validation;

pub use form::{CHECKED_VALUE, FieldKind, FieldValue, FormField, FormMethod, HostForm};
pub use snapshot::{ACTION_FIELD, FormSnapshot};
pub use validation::{
    MT_MAX, MT_MIN, ValidationError, parse_motor_threshold, validate_date, validate_decimal,
    validate_integer, validate_pattern, validate_required,
};
