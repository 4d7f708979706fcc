//! ClearDisplayMessage (CSMS → CS)
//!
//! Removes a display message previously installed with SetDisplayMessage.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::{ClearMessageStatus, CustomData, StatusInfo};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClearDisplayMessageRequest {
    /// Id of the message to remove.
    #[validate(range(min = 0))]
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl ClearDisplayMessageRequest {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            custom_data: None,
        }
    }
}

impl RequestPayload for ClearDisplayMessageRequest {
    const ACTION: &'static str = "ClearDisplayMessage";
    const DIRECTION: MessageDirection = MessageDirection::CsmsToStation;
    type Response = ClearDisplayMessageResponse;
}

impl fmt::Display for ClearDisplayMessageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Clear display message #{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClearDisplayMessageResponse {
    pub status: ClearMessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub status_info: Option<StatusInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl ClearDisplayMessageResponse {
    pub fn new(status: ClearMessageStatus) -> Self {
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

impl ResponsePayload for ClearDisplayMessageResponse {
    type Request = ClearDisplayMessageRequest;

    fn failure(_request: &ClearDisplayMessageRequest) -> Self {
        Self::new(ClearMessageStatus::Rejected)
    }
}

impl fmt::Display for ClearDisplayMessageResponse {
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
    use crate::messages::{Request, RequestMeta, Response, ResponseMeta};
    use crate::shared::MessageError;

    #[test]
    fn parses_request() {
        let req = Request::<ClearDisplayMessageRequest>::parse(
            &json!({ "id": 42 }),
            RequestMeta::default(),
        )
        .unwrap();
        assert_eq!(req.payload.id, 42);
        assert_eq!(req.to_string(), "Clear display message #42");
        assert_eq!(req.to_json(), json!({ "id": 42 }));
    }

    #[test]
    fn missing_id_is_a_formation_error() {
        let err = Request::<ClearDisplayMessageRequest>::parse(&json!({}), RequestMeta::default())
            .unwrap_err();
        match err {
            MessageError::Formation { action, reason } => {
                assert_eq!(action, "ClearDisplayMessage");
                assert!(reason.contains("id"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn negative_id_fails_validation() {
        let err = Request::<ClearDisplayMessageRequest>::parse(
            &json!({ "id": -1 }),
            RequestMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Validation { .. }));
    }

    #[test]
    fn parses_response_with_status_info() {
        let req = Request::to(Default::default(), ClearDisplayMessageRequest::new(1));
        let json = json!({
            "status": "Unknown",
            "statusInfo": { "reasonCode": "UnknownMessage", "additionalInfo": "never set" }
        });
        let resp = Response::<ClearDisplayMessageResponse>::parse(
            &req,
            &json,
            ResponseMeta::for_request(&req.meta),
        )
        .unwrap();
        assert_eq!(resp.payload.status, ClearMessageStatus::Unknown);
        assert_eq!(resp.to_string(), "Unknown (UnknownMessage: never set)");
        assert_eq!(resp.to_json(), json);
    }
}
