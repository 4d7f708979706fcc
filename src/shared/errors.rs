use thiserror::Error;

use crate::domain::ResultCode;

/// Why a JSON payload could not be turned into a typed message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("{action}: invalid JSON: {reason}")]
    InvalidJson { action: &'static str, reason: String },

    #[error("{action}: payload must be a JSON object")]
    NotAnObject { action: &'static str },

    /// Missing mandatory member, wrong JSON type or unknown enum value.
    #[error("{action}: {reason}")]
    Formation { action: &'static str, reason: String },

    /// Well-formed JSON violating a schema constraint (length, range, ...).
    #[error("{action}: validation failed: {reason}")]
    Validation { action: &'static str, reason: String },

    #[error("{action}: invalid signatures: {reason}")]
    Signature { action: &'static str, reason: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("{action} is not a {expected}")]
    WrongDirection {
        action: String,
        expected: &'static str,
    },
}

impl MessageError {
    /// Result code a failure response for this error carries.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::Signature { .. } => ResultCode::SignatureError,
            Self::UnknownAction(_) => ResultCode::NotImplemented,
            Self::WrongDirection { .. } => ResultCode::ProtocolError,
            Self::InvalidJson { .. }
            | Self::NotAnObject { .. }
            | Self::Formation { .. }
            | Self::Validation { .. } => ResultCode::FormationViolation,
        }
    }
}
