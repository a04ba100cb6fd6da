use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FlagError;

/// The kind of value a flag holds. Fixed when the flag is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Boolean,
    Numeric,
}

impl FlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::Boolean => "boolean",
            FlagType::Numeric => "numeric",
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagType {
    type Err = FlagError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "boolean" => Ok(FlagType::Boolean),
            "numeric" => Ok(FlagType::Numeric),
            other => Err(FlagError::InvalidValue(format!(
                "unknown flag type {other:?}"
            ))),
        }
    }
}

/// Current value of a flag. Exactly one payload, so a value can never be both
/// or neither.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagValue {
    Boolean(bool),
    Numeric(f64),
}

impl FlagValue {
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Boolean(_) => FlagType::Boolean,
            FlagValue::Numeric(_) => FlagType::Numeric,
        }
    }

    pub fn matches(&self, flag_type: FlagType) -> bool {
        self.flag_type() == flag_type
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Boolean(b) => Some(*b),
            FlagValue::Numeric(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlagValue::Numeric(n) => Some(*n),
            FlagValue::Boolean(_) => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Boolean(b) => write!(f, "{b}"),
            FlagValue::Numeric(n) => write!(f, "{n}"),
        }
    }
}

/// A persisted feature flag.
///
/// `name` and `flag_type` never change after creation; `value` and
/// `updated_at` change together on every value update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub flag_type: FlagType,
    pub description: String,
    pub value: FlagValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flag {
    /// Build a freshly created flag with both timestamps set to `now`.
    pub fn new(
        name: impl Into<String>,
        flag_type: FlagType,
        description: impl Into<String>,
        value: FlagValue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            flag_type,
            description: description.into(),
            value,
            created_at: now,
            updated_at: now,
        }
    }

    /// Type and value agree. Holds for every flag the service has persisted.
    pub fn is_coherent(&self) -> bool {
        self.value.matches(self.flag_type)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn flag_type_round_trips_through_tokens() {
        assert_eq!("boolean".parse::<FlagType>(), Ok(FlagType::Boolean));
        assert_eq!("numeric".parse::<FlagType>(), Ok(FlagType::Numeric));
        assert_eq!(FlagType::Boolean.to_string(), "boolean");
        assert_eq!(FlagType::Numeric.to_string(), "numeric");
    }

    #[test]
    fn unknown_flag_type_is_invalid_value() {
        for token in ["string", "Boolean", "", " numeric"] {
            assert!(
                matches!(token.parse::<FlagType>(), Err(FlagError::InvalidValue(_))),
                "{token:?} should be rejected"
            );
        }
    }

    #[test]
    fn value_reports_its_type() {
        assert_eq!(FlagValue::Boolean(false).flag_type(), FlagType::Boolean);
        assert_eq!(FlagValue::Numeric(42.5).flag_type(), FlagType::Numeric);
        assert!(FlagValue::Numeric(0.0).matches(FlagType::Numeric));
        assert!(!FlagValue::Numeric(0.0).matches(FlagType::Boolean));
        assert_eq!(FlagValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(FlagValue::Boolean(true).as_f64(), None);
        assert_eq!(FlagValue::Numeric(2.5).as_f64(), Some(2.5));
    }

    #[test]
    fn new_flag_has_equal_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let flag = Flag::new(
            "rate-limit",
            FlagType::Numeric,
            "holds a numeric value",
            FlagValue::Numeric(42.5),
            now,
        );
        assert_eq!(flag.created_at, flag.updated_at);
        assert!(flag.is_coherent());
    }

    #[test]
    fn incoherent_flag_is_detected() {
        let flag = Flag {
            name: "dark-mode".into(),
            flag_type: FlagType::Boolean,
            description: String::new(),
            value: FlagValue::Numeric(1.0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!flag.is_coherent());
    }
}
