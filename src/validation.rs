use core::fmt;

use crate::dto::ValueInput;
use crate::error::FlagError;
use crate::flag::{FlagType, FlagValue};

pub const MAX_NAME_LEN: usize = 63;

/// The name rule a rejected flag name broke first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    Empty,
    TooLong,
    FirstChar,
    EdgeHyphen,
    Charset,
}

impl fmt::Display for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NameRule::Empty => "name must not be empty",
            NameRule::TooLong => "name must not exceed 63 characters",
            NameRule::FirstChar => "name must start with a lowercase letter",
            NameRule::EdgeHyphen => "name must not start or end with a hyphen",
            NameRule::Charset => {
                "name must contain only lowercase letters, digits, and hyphens"
            }
        };
        f.write_str(msg)
    }
}

/// Check a flag name against the naming rules, reporting the first rule it
/// breaks.
pub fn validate_flag_name(name: &str) -> Result<(), FlagError> {
    match first_broken_rule(name) {
        Some(rule) => Err(FlagError::InvalidName { rule }),
        None => Ok(()),
    }
}

fn first_broken_rule(name: &str) -> Option<NameRule> {
    let bytes = name.as_bytes();
    let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
        return Some(NameRule::Empty);
    };
    if bytes.len() > MAX_NAME_LEN {
        return Some(NameRule::TooLong);
    }
    if !first.is_ascii_lowercase() {
        return Some(NameRule::FirstChar);
    }
    if first == b'-' || last == b'-' {
        return Some(NameRule::EdgeHyphen);
    }
    let allowed = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-';
    if !bytes.iter().all(allowed) {
        return Some(NameRule::Charset);
    }
    None
}

/// Check that `input` carries exactly the payload `flag_type` calls for and
/// turn it into a typed [`FlagValue`].
///
/// An empty input, an input with both payloads, or an input with the other
/// payload is a [`FlagError::TypeMismatch`]. A numeric payload that is NaN or
/// infinite is a [`FlagError::InvalidValue`].
pub fn validate_flag_value(flag_type: FlagType, input: &ValueInput) -> Result<FlagValue, FlagError> {
    let mismatch = |reason| FlagError::TypeMismatch {
        expected: flag_type,
        reason,
    };

    match (flag_type, input.boolean, input.numeric) {
        (FlagType::Boolean, Some(b), None) => Ok(FlagValue::Boolean(b)),
        (FlagType::Numeric, None, Some(n)) if n.is_finite() => Ok(FlagValue::Numeric(n)),
        (FlagType::Numeric, None, Some(n)) => Err(FlagError::InvalidValue(format!(
            "numeric value must be finite, got {n}"
        ))),
        (_, None, None) => Err(mismatch("value is empty")),
        (_, Some(_), Some(_)) => Err(mismatch("value holds both a bool and a numeric")),
        (FlagType::Boolean, None, Some(_)) => Err(mismatch("boolean flag requires a bool value")),
        (FlagType::Numeric, Some(_), None) => {
            Err(mismatch("numeric flag requires a numeric value"))
        }
    }
}
