use crate::context::Interrupted;
use crate::flag::FlagType;
use crate::validation::NameRule;

/// Every error a [`FlagService`](crate::service::FlagService) operation can
/// return. Store adapters report their failures with the same type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlagError {
    #[error("invalid flag name: {rule}")]
    InvalidName { rule: NameRule },

    /// Unknown type token or an unusable value payload.
    #[error("invalid flag value: {0}")]
    InvalidValue(String),

    #[error("value type does not match flag type {expected}: {reason}")]
    TypeMismatch {
        expected: FlagType,
        reason: &'static str,
    },

    #[error("flag not found")]
    NotFound,

    #[error("flag already exists")]
    AlreadyExists,

    /// The durable store is unreachable or failed in a way it could not
    /// classify.
    #[error("store unavailable: {0}")]
    Infra(String),
}

impl From<Interrupted> for FlagError {
    fn from(err: Interrupted) -> Self {
        FlagError::Infra(err.to_string())
    }
}

/// Outcome class a transport maps an error to. The core never picks status
/// codes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    BadRequest,
    ServiceUnavailable,
    Internal,
}

impl FlagError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FlagError::NotFound => ErrorClass::NotFound,
            FlagError::AlreadyExists => ErrorClass::Conflict,
            FlagError::InvalidName { .. }
            | FlagError::InvalidValue(_)
            | FlagError::TypeMismatch { .. } => ErrorClass::BadRequest,
            FlagError::Infra(_) => ErrorClass::ServiceUnavailable,
        }
    }
}

impl ErrorClass {
    /// Classify any error; anything that is not a [`FlagError`] is
    /// [`ErrorClass::Internal`].
    pub fn of(err: &(dyn std::error::Error + 'static)) -> Self {
        err.downcast_ref::<FlagError>()
            .map_or(ErrorClass::Internal, FlagError::class)
    }
}
