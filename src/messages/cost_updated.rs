//! CostUpdated (CSMS → CS)
//!
//! Pushes the running total cost of a transaction to the station so it can
//! be shown to the driver.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::CustomData;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CostUpdatedRequest {
    /// Current total cost including taxes, in the currency configured in
    /// `TariffCostCtrlr.Currency`.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    #[validate(length(min = 1, max = 36))]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl CostUpdatedRequest {
    pub fn new(transaction_id: impl Into<String>, total_cost: Decimal) -> Self {
        Self {
            total_cost,
            transaction_id: transaction_id.into(),
            custom_data: None,
        }
    }
}

impl RequestPayload for CostUpdatedRequest {
    const ACTION: &'static str = "CostUpdated";
    const DIRECTION: MessageDirection = MessageDirection::CsmsToStation;
    type Response = CostUpdatedResponse;
}

impl fmt::Display for CostUpdatedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total cost of transaction {} is now {}",
            self.transaction_id, self.total_cost
        )
    }
}

/// Empty acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CostUpdatedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl ResponsePayload for CostUpdatedResponse {
    type Request = CostUpdatedRequest;

    fn failure(_request: &CostUpdatedRequest) -> Self {
        Self::default()
    }
}

impl fmt::Display for CostUpdatedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cost update acknowledged")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;
    use crate::domain::ResultCode;
    use crate::messages::{Request, RequestMeta, Response};
    use crate::shared::MessageError;

    #[test]
    fn total_cost_is_a_json_number() {
        let req = Request::to(
            Default::default(),
            CostUpdatedRequest::new("tx-1", Decimal::from_str("12.5").unwrap()),
        );
        assert_eq!(
            req.to_json(),
            json!({ "totalCost": 12.5, "transactionId": "tx-1" })
        );
    }

    #[test]
    fn parses_integer_and_fractional_costs() {
        let req = Request::<CostUpdatedRequest>::parse(
            &json!({ "totalCost": 3, "transactionId": "tx-1" }),
            RequestMeta::default(),
        )
        .unwrap();
        assert_eq!(req.payload.total_cost, Decimal::from(3));

        let req = Request::<CostUpdatedRequest>::parse(
            &json!({ "totalCost": 0.25, "transactionId": "tx-1" }),
            RequestMeta::default(),
        )
        .unwrap();
        assert_eq!(req.payload.total_cost, Decimal::from_str("0.25").unwrap());
        assert_eq!(req.to_string(), "Total cost of transaction tx-1 is now 0.25");
    }

    #[test]
    fn overlong_transaction_id_fails_validation() {
        let err = Request::<CostUpdatedRequest>::parse(
            &json!({ "totalCost": 1, "transactionId": "x".repeat(37) }),
            RequestMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Validation { .. }));
    }

    #[test]
    fn failure_response_is_empty_with_result_code() {
        let req = Request::to(
            Default::default(),
            CostUpdatedRequest::new("tx-1", Decimal::ONE),
        );
        let resp = Response::<CostUpdatedResponse>::formation_violation(&req, "bad");
        assert_eq!(resp.to_json(), json!({}));
        assert_eq!(resp.result.code, ResultCode::FormationViolation);
    }
}
