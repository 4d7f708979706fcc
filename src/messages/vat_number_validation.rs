//! VatNumberValidation (CS → CSMS, OCPP 2.1 only)
//!
//! A driver entered a VAT number at the station, e.g. to get a company
//! invoice. The CSMS checks it and returns the registered company address.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::{Address, CustomData, GenericStatus, StatusInfo};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VatNumberValidationRequest {
    #[validate(length(min = 1, max = 20))]
    pub vat_number: String,
    /// EVSE the number was entered at; absent when entered for the whole
    /// station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub evse_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl VatNumberValidationRequest {
    pub fn new(vat_number: impl Into<String>) -> Self {
        Self {
            vat_number: vat_number.into(),
            evse_id: None,
            custom_data: None,
        }
    }

    pub fn at_evse(mut self, evse_id: i32) -> Self {
        self.evse_id = Some(evse_id);
        self
    }
}

impl RequestPayload for VatNumberValidationRequest {
    const ACTION: &'static str = "VatNumberValidation";
    const DIRECTION: MessageDirection = MessageDirection::StationToCsms;
    type Response = VatNumberValidationResponse;
}

impl fmt::Display for VatNumberValidationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validate VAT number {}", self.vat_number)?;
        if let Some(evse_id) = self.evse_id {
            write!(f, " at EVSE {}", evse_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VatNumberValidationResponse {
    /// Echo of the validated number.
    #[validate(length(min = 1, max = 20))]
    pub vat_number: String,
    pub status: GenericStatus,
    /// Registered company, only for `Accepted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub company: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub evse_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub status_info: Option<StatusInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl VatNumberValidationResponse {
    /// Accepts the number of `request`, echoing its VAT number and EVSE.
    pub fn accepted(request: &VatNumberValidationRequest, company: Address) -> Self {
        Self {
            company: Some(company),
            status: GenericStatus::Accepted,
            ..Self::rejected(request)
        }
    }

    /// Rejects the number of `request`, echoing its VAT number and EVSE.
    pub fn rejected(request: &VatNumberValidationRequest) -> Self {
        Self {
            vat_number: request.vat_number.clone(),
            status: GenericStatus::Rejected,
            company: None,
            evse_id: request.evse_id,
            status_info: None,
            custom_data: None,
        }
    }

    pub fn with_status_info(mut self, status_info: StatusInfo) -> Self {
        self.status_info = Some(status_info);
        self
    }
}

impl ResponsePayload for VatNumberValidationResponse {
    type Request = VatNumberValidationRequest;

    fn failure(request: &VatNumberValidationRequest) -> Self {
        Self::rejected(request)
    }
}

impl fmt::Display for VatNumberValidationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VAT number {} {}", self.vat_number, self.status)?;
        if let Some(company) = &self.company {
            write!(f, ": {}", company)?;
        }
        if let Some(info) = &self.status_info {
            write!(f, " ({})", info)?;
        }
        Ok(())
    }
}
