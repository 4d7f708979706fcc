//! Customer identification: id tokens and certificate hashes

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CustomData;

/// Additional identification attached to an [`IdToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    #[validate(length(min = 1, max = 255))]
    pub additional_id_token: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

/// An identifier used for authorization (RFID uid, eMAID, key code, ...).
///
/// OCPP 2.1 made `type` an open string (max 20 chars) instead of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdToken {
    #[validate(length(max = 255))]
    pub id_token: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1), nested)]
    pub additional_info: Option<Vec<AdditionalInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl IdToken {
    pub fn new(id_token: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            kind: kind.into(),
            additional_info: None,
            custom_data: None,
        }
    }

    pub fn with_additional_info(
        mut self,
        additional_id_token: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.additional_info
            .get_or_insert_with(Vec::new)
            .push(AdditionalInfo {
                additional_id_token: additional_id_token.into(),
                kind: kind.into(),
                custom_data: None,
            });
        self
    }
}

impl fmt::Display for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id_token, self.kind)
    }
}

/// Hash algorithms allowed in [`CertificateHashData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA384")]
    Sha384,
    #[serde(rename = "SHA512")]
    Sha512,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}

/// Identifies a certificate by issuer hashes and serial number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CertificateHashData {
    pub hash_algorithm: HashAlgorithm,
    #[validate(length(min = 1, max = 128))]
    pub issuer_name_hash: String,
    #[validate(length(min = 1, max = 128))]
    pub issuer_key_hash: String,
    #[validate(length(min = 1, max = 40))]
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl fmt::Display for CertificateHashData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "certificate {} ({})", self.serial_number, self.hash_algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_token_uses_type_key() {
        let token = IdToken::new("04A2B3C4", "ISO14443");
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "idToken": "04A2B3C4", "type": "ISO14443" })
        );
    }

    #[test]
    fn id_token_type_is_limited_to_20_chars() {
        let token = IdToken::new("abc", "x".repeat(21));
        assert!(token.validate().is_err());
    }

    #[test]
    fn additional_info_must_not_be_empty() {
        let token: IdToken = serde_json::from_value(serde_json::json!({
            "idToken": "04A2B3C4",
            "type": "ISO14443",
            "additionalInfo": []
        }))
        .unwrap();
        assert!(token.validate().is_err());

        let token = IdToken::new("04A2B3C4", "ISO14443").with_additional_info("EMP-1", "eMAID");
        assert!(token.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&token).unwrap()["additionalInfo"],
            serde_json::json!([{ "additionalIdToken": "EMP-1", "type": "eMAID" }])
        );
    }

    #[test]
    fn certificate_hash_parses_algorithm_names() {
        let json = serde_json::json!({
            "hashAlgorithm": "SHA384",
            "issuerNameHash": "aa",
            "issuerKeyHash": "bb",
            "serialNumber": "01"
        });
        let hash: CertificateHashData = serde_json::from_value(json).unwrap();
        assert_eq!(hash.hash_algorithm, HashAlgorithm::Sha384);
        assert!(hash.validate().is_ok());
    }
}
