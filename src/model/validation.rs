use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

/// Lowest motor threshold (%) accepted by the wizard.
pub const MT_MIN: i64 = 10;
/// Highest motor threshold (%) accepted by the wizard.
pub const MT_MAX: i64 = 100;

/// Validation errors for host form fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },
    #[error("{field} does not match the expected format")]
    PatternMismatch { field: String },
    #[error("{field} must be a whole number, got {value:?}")]
    NotANumber { field: String, value: String },
    #[error("{field} must be a decimal number, got {value:?}")]
    NotADecimal { field: String, value: String },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{field} must be a date (YYYY-MM-DD), got {value:?}")]
    NotADate { field: String, value: String },
}

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid hardcoded regex"));

/// Validates that a required value is present (non-blank).
pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validates a value against a field-declared pattern. The whole value must match.
pub fn validate_pattern(field: &str, value: &str, pattern: &Regex) -> Result<(), ValidationError> {
    let matches_whole = pattern
        .find(value)
        .is_some_and(|m| m.start() == 0 && m.end() == value.len());
    if matches_whole {
        Ok(())
    } else {
        Err(ValidationError::PatternMismatch {
            field: field.to_string(),
        })
    }
}

/// Parses a whole number and checks it against optional inclusive bounds.
///
/// Parsing is strict: surrounding whitespace is ignored, but fractional or
/// trailing characters (`"60.5"`, `"60%"`) are rejected.
pub fn validate_integer(
    field: &str,
    value: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, ValidationError> {
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field: field.to_string(),
            value: value.to_string(),
        })?;
    let below = min.is_some_and(|m| parsed < m);
    let above = max.is_some_and(|m| parsed > m);
    if below || above {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: parsed,
            min: min.unwrap_or(i64::MIN),
            max: max.unwrap_or(i64::MAX),
        });
    }
    Ok(parsed)
}

/// Validates a decimal value such as a train duration (`2.0`).
pub fn validate_decimal(field: &str, value: &str) -> Result<(), ValidationError> {
    if DECIMAL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::NotADecimal {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parses an ISO calendar date (`2025-01-31`).
pub fn validate_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::NotADate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parses a motor threshold measurement: a whole number in `[MT_MIN, MT_MAX]`.
pub fn parse_motor_threshold(value: &str) -> Result<i64, ValidationError> {
    validate_integer("motor threshold", value, Some(MT_MIN), Some(MT_MAX))
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    // --- validate_required ---

    #[test]
    fn required_present() {
        assert_eq!(validate_required("name", "Tanaka"), Ok(()));
    }

    #[test]
    fn required_empty() {
        assert_eq!(
            validate_required("name", ""),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn required_whitespace_only() {
        assert!(validate_required("name", "   ").is_err());
    }

    // --- validate_pattern ---

    #[test]
    fn pattern_whole_match() {
        let re = Regex::new(r"\d{3}").unwrap();
        assert_eq!(validate_pattern("code", "123", &re), Ok(()));
    }

    #[test]
    fn pattern_partial_match_rejected() {
        let re = Regex::new(r"\d{3}").unwrap();
        assert_eq!(
            validate_pattern("code", "a123", &re),
            Err(ValidationError::PatternMismatch {
                field: "code".to_string()
            })
        );
    }

    // --- validate_integer ---

    #[test]
    fn integer_in_range() {
        assert_eq!(validate_integer("n", "42", Some(0), Some(100)), Ok(42));
    }

    #[test]
    fn integer_surrounding_whitespace() {
        assert_eq!(validate_integer("n", " 42 ", None, None), Ok(42));
    }

    #[test]
    fn integer_fraction_rejected() {
        assert_eq!(
            validate_integer("n", "60.5", None, None),
            Err(ValidationError::NotANumber {
                field: "n".to_string(),
                value: "60.5".to_string()
            })
        );
    }

    #[test]
    fn integer_out_of_range() {
        assert_eq!(
            validate_integer("n", "101", Some(10), Some(100)),
            Err(ValidationError::OutOfRange {
                field: "n".to_string(),
                value: 101,
                min: 10,
                max: 100
            })
        );
    }

    // --- validate_decimal ---

    #[test]
    fn decimal_accepts_integer_and_fraction() {
        assert_eq!(validate_decimal("s", "2"), Ok(()));
        assert_eq!(validate_decimal("s", "2.0"), Ok(()));
    }

    #[test]
    fn decimal_rejects_trailing_dot() {
        assert!(validate_decimal("s", "2.").is_err());
    }

    // --- validate_date ---

    #[test]
    fn date_iso() {
        assert_eq!(
            validate_date("d", "2025-01-31"),
            Ok(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
        );
    }

    #[test]
    fn date_invalid_day() {
        assert!(validate_date("d", "2025-02-30").is_err());
    }

    // --- parse_motor_threshold ---

    #[test]
    fn mt_boundaries_accepted() {
        assert_eq!(parse_motor_threshold("10"), Ok(10));
        assert_eq!(parse_motor_threshold("100"), Ok(100));
    }

    #[test]
    fn mt_just_outside_rejected() {
        assert!(parse_motor_threshold("9").is_err());
        assert!(parse_motor_threshold("101").is_err());
    }

    #[test]
    fn mt_empty_rejected() {
        assert!(matches!(
            parse_motor_threshold(""),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[quickcheck]
    fn mt_accepts_exactly_the_inclusive_range(n: i16) -> bool {
        let n = i64::from(n);
        parse_motor_threshold(&n.to_string()).is_ok() == (MT_MIN..=MT_MAX).contains(&n)
    }
}
