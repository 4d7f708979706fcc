//! Postal address returned by VAT number validation

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CustomData;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Company or person name.
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub address2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.address1)?;
        if let Some(address2) = &self.address2 {
            write!(f, ", {}", address2)?;
        }
        match &self.postal_code {
            Some(postal_code) => write!(f, ", {} {}", postal_code, self.city)?,
            None => write!(f, ", {}", self.city)?,
        }
        write!(f, ", {}", self.country)
    }
}
