//! `StatusInfoType`: reason code plus free-text detail attached to responses

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CustomData;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    /// Predefined, case-insensitive reason code.
    #[validate(length(min = 1, max = 20))]
    pub reason_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1024))]
    pub additional_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl StatusInfo {
    pub fn new(reason_code: impl Into<String>) -> Self {
        Self {
            reason_code: reason_code.into(),
            additional_info: None,
            custom_data: None,
        }
    }

    pub fn with_info(reason_code: impl Into<String>, additional_info: impl Into<String>) -> Self {
        Self {
            reason_code: reason_code.into(),
            additional_info: Some(additional_info.into()),
            custom_data: None,
        }
    }
}

impl fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.additional_info {
            Some(info) => write!(f, "{}: {}", self.reason_code, info),
            None => f.write_str(&self.reason_code),
        }
    }
}
