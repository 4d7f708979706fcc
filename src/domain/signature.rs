//! Message signatures (carried as data)
//!
//! Requests and responses may carry a `signatures` array. Producing and
//! verifying the cryptographic values happens outside this crate; here they
//! are parsed, shape-checked and serialized back.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single signature over a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    /// Identifies the public key needed to verify `value`.
    #[validate(length(min = 1, max = 255))]
    pub key_id: String,
    /// Base64 encoded signature value.
    #[validate(length(min = 1))]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub signing_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub encoding_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Signature {
    pub fn new(key_id: impl Into<String>, value: &[u8]) -> Self {
        Self {
            key_id: key_id.into(),
            value: STANDARD.encode(value),
            signing_method: None,
            encoding_method: None,
            name: None,
            description: None,
            timestamp: None,
        }
    }

    /// Decode the base64 signature value.
    pub fn value_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.value.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_base64_encoded() {
        let sig = Signature::new("key-1", &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(sig.value, "3q2+7w==");
        assert_eq!(sig.value_bytes().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn optional_members_are_omitted() {
        let json = serde_json::to_value(Signature::new("k", b"x")).unwrap();
        assert_eq!(json, serde_json::json!({ "keyId": "k", "value": "eA==" }));
    }

    #[test]
    fn malformed_value_does_not_decode() {
        let mut sig = Signature::new("k", b"x");
        sig.value = "***".into();
        assert!(sig.value_bytes().is_err());
    }
}
