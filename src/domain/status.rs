//! Response status enumerations

use std::fmt;

use serde::{Deserialize, Serialize};

/// `GenericStatusEnumType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericStatus {
    Accepted,
    Rejected,
}

impl fmt::Display for GenericStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Answer to ClearDisplayMessage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearMessageStatus {
    Accepted,
    /// No message with the given id is known.
    Unknown,
    Rejected,
}

impl fmt::Display for ClearMessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Unknown => write!(f, "Unknown"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Answer to CustomerInformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerInformationStatus {
    Accepted,
    Rejected,
    /// The request was malformed, e.g. neither `report` nor `clear` was set.
    Invalid,
}

impl fmt::Display for CustomerInformationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Answer to GetDisplayMessages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GetDisplayMessagesStatus {
    /// Matching messages exist and will follow in NotifyDisplayMessages.
    Accepted,
    Unknown,
}

impl fmt::Display for GetDisplayMessagesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Answer to SetDisplayMessage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayMessageStatus {
    Accepted,
    NotSupportedMessageFormat,
    Rejected,
    NotSupportedPriority,
    NotSupportedState,
    UnknownTransaction,
    LanguageNotSupported,
}

impl fmt::Display for DisplayMessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accepted => "Accepted",
            Self::NotSupportedMessageFormat => "NotSupportedMessageFormat",
            Self::Rejected => "Rejected",
            Self::NotSupportedPriority => "NotSupportedPriority",
            Self::NotSupportedState => "NotSupportedState",
            Self::UnknownTransaction => "UnknownTransaction",
            Self::LanguageNotSupported => "LanguageNotSupported",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_names() {
        for status in [
            DisplayMessageStatus::Accepted,
            DisplayMessageStatus::NotSupportedMessageFormat,
            DisplayMessageStatus::LanguageNotSupported,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, serde_json::Value::String(status.to_string()));
        }
    }

    #[test]
    fn unknown_status_value_fails_to_parse() {
        let parsed: Result<ClearMessageStatus, _> = serde_json::from_str("\"Maybe\"");
        assert!(parsed.is_err());
    }
}
