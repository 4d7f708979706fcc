//! Vendor extension object allowed on every OCPP 2.1 payload

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// `customData`: a `vendorId` plus any vendor-defined properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    #[validate(length(min = 1, max = 255))]
    pub vendor_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomData {
    pub fn new(vendor_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl Hash for CustomData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vendor_id.hash(state);
        // Map is key-ordered, so the compact rendering is canonical.
        Value::Object(self.extra.clone()).to_string().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_properties_are_flattened() {
        let data = CustomData::new("com.example").with("shade", "blue");
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "vendorId": "com.example", "shade": "blue" })
        );

        let back: CustomData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn empty_vendor_id_fails_validation() {
        assert!(CustomData::new("").validate().is_err());
    }
}
