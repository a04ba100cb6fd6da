//! Request and response shapes exchanged with whatever transport sits in front
//! of [`FlagService`](crate::service::FlagService).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flag::{Flag, FlagType, FlagValue};

/// A flag value as it arrives from outside: either, both or neither payload may
/// be present until it is validated against a flag type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueInput {
    #[serde(rename = "bool", default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<f64>,
}

impl ValueInput {
    pub fn boolean(value: bool) -> Self {
        Self {
            boolean: Some(value),
            numeric: None,
        }
    }

    pub fn numeric(value: f64) -> Self {
        Self {
            boolean: None,
            numeric: Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boolean.is_none() && self.numeric.is_none()
    }
}

impl From<FlagValue> for ValueInput {
    fn from(value: FlagValue) -> Self {
        match value {
            FlagValue::Boolean(b) => Self::boolean(b),
            FlagValue::Numeric(n) => Self::numeric(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFlagRequest {
    pub name: String,
    /// `"boolean"` or `"numeric"`. Kept as a raw token so an unknown type is
    /// reported by the service rather than by the deserializer.
    #[serde(rename = "type")]
    pub flag_type: String,
    #[serde(default)]
    pub description: String,
    pub value: ValueInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateFlagValueRequest {
    pub value: ValueInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub name: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub description: String,
    pub value: ValueInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Flag> for FlagResponse {
    fn from(flag: Flag) -> Self {
        Self {
            name: flag.name,
            flag_type: flag.flag_type,
            description: flag.description,
            value: flag.value.into(),
            created_at: flag.created_at,
            updated_at: flag.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagValueResponse {
    pub value: ValueInput,
}

impl From<FlagValue> for FlagValueResponse {
    fn from(value: FlagValue) -> Self {
        Self {
            value: value.into(),
        }
    }
}
