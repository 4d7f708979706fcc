//! CustomerInformation (CSMS → CS)
//!
//! Asks the station to report and/or delete everything it stores about a
//! customer, identified by id token, certificate or free-form identifier.
//! The data itself follows in NotifyCustomerInformation messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::{
    CertificateHashData, CustomData, CustomerInformationStatus, IdToken, StatusInfo,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInformationRequest {
    #[validate(range(min = 0))]
    pub request_id: i32,
    /// Send the customer's data in NotifyCustomerInformation.
    pub report: bool,
    /// Delete the customer's data.
    pub clear: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub customer_certificate: Option<CertificateHashData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub id_token: Option<IdToken>,
    /// Vendor-specific identifier, e.g. a contract id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 64))]
    pub customer_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl CustomerInformationRequest {
    pub fn new(request_id: i32, report: bool, clear: bool) -> Self {
        Self {
            request_id,
            report,
            clear,
            customer_certificate: None,
            id_token: None,
            customer_identifier: None,
            custom_data: None,
        }
    }

    pub fn for_id_token(mut self, id_token: IdToken) -> Self {
        self.id_token = Some(id_token);
        self
    }

    pub fn for_certificate(mut self, certificate: CertificateHashData) -> Self {
        self.customer_certificate = Some(certificate);
        self
    }

    pub fn for_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.customer_identifier = Some(identifier.into());
        self
    }

    /// Neither report nor clear requested; a station answers `Invalid`.
    pub fn is_noop(&self) -> bool {
        !self.report && !self.clear
    }

    /// Whether any customer reference is given. Without one the request
    /// covers all customers.
    pub fn has_customer_reference(&self) -> bool {
        self.customer_certificate.is_some()
            || self.id_token.is_some()
            || self.customer_identifier.is_some()
    }
}

impl RequestPayload for CustomerInformationRequest {
    const ACTION: &'static str = "CustomerInformation";
    const DIRECTION: MessageDirection = MessageDirection::CsmsToStation;
    type Response = CustomerInformationResponse;
}

impl fmt::Display for CustomerInformationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match (self.report, self.clear) {
            (true, true) => "Report and clear",
            (true, false) => "Report",
            (false, true) => "Clear",
            (false, false) => "No-op",
        };
        write!(f, "{} customer information (request {})", what, self.request_id)?;
        if let Some(token) = &self.id_token {
            write!(f, " for id token {}", token)?;
        }
        if let Some(certificate) = &self.customer_certificate {
            write!(f, " for {}", certificate)?;
        }
        if let Some(identifier) = &self.customer_identifier {
            write!(f, " for customer '{}'", identifier)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInformationResponse {
    pub status: CustomerInformationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub status_info: Option<StatusInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl CustomerInformationResponse {
    pub fn new(status: CustomerInformationStatus) -> Self {
        Self {
            status,
            status_info: None,
            custom_data: None,
        }
    }

    pub fn with_status_info(mut self, status_info: StatusInfo) -> Self {
        self.status_info = Some(status_info);
        self
    }
}

impl ResponsePayload for CustomerInformationResponse {
    type Request = CustomerInformationRequest;

    fn failure(_request: &CustomerInformationRequest) -> Self {
        Self::new(CustomerInformationStatus::Rejected)
    }
}

impl fmt::Display for CustomerInformationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(info) = &self.status_info {
            write!(f, " ({})", info)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::messages::{Request, RequestMeta};
    use crate::shared::MessageError;

    #[test]
    fn parses_request_with_id_token() {
        let json = json!({
            "requestId": 9,
            "report": true,
            "clear": false,
            "idToken": { "idToken": "04A2B3C4", "type": "ISO14443" }
        });
        let req = Request::<CustomerInformationRequest>::parse(&json, RequestMeta::default())
            .unwrap();
        assert!(req.payload.has_customer_reference());
        assert!(!req.payload.is_noop());
        assert_eq!(
            req.to_string(),
            "Report customer information (request 9) for id token 04A2B3C4 (ISO14443)"
        );
        assert_eq!(req.to_json(), json);
    }

    #[test]
    fn report_and_clear_are_mandatory() {
        let err = Request::<CustomerInformationRequest>::parse(
            &json!({ "requestId": 1, "report": true }),
            RequestMeta::default(),
        )
        .unwrap_err();
        match err {
            MessageError::Formation { reason, .. } => assert!(reason.contains("clear")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn nested_id_token_is_validated() {
        let err = Request::<CustomerInformationRequest>::parse(
            &json!({
                "requestId": 1,
                "report": true,
                "clear": true,
                "idToken": { "idToken": "x", "type": "" }
            }),
            RequestMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Validation { .. }));
    }

    #[test]
    fn empty_additional_info_is_rejected() {
        let err = Request::<CustomerInformationRequest>::parse(
            &json!({
                "requestId": 1,
                "report": true,
                "clear": false,
                "idToken": { "idToken": "x", "type": "Central", "additionalInfo": [] }
            }),
            RequestMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Validation { .. }));
    }

    #[test]
    fn noop_request_is_detected() {
        let req = CustomerInformationRequest::new(2, false, false);
        assert!(req.is_noop());
        assert!(!req.has_customer_reference());
        assert_eq!(req.to_string(), "No-op customer information (request 2)");
    }
}
