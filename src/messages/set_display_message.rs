//! SetDisplayMessage (CSMS → CS)
//!
//! Installs a message on the station display. A message with an id that is
//! already in use replaces the old one.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::{CustomData, DisplayMessageStatus, MessageInfo, StatusInfo};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetDisplayMessageRequest {
    #[validate(nested)]
    pub message: MessageInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl SetDisplayMessageRequest {
    pub fn new(message: MessageInfo) -> Self {
        Self {
            message,
            custom_data: None,
        }
    }
}

impl RequestPayload for SetDisplayMessageRequest {
    const ACTION: &'static str = "SetDisplayMessage";
    const DIRECTION: MessageDirection = MessageDirection::CsmsToStation;
    type Response = SetDisplayMessageResponse;
}

impl fmt::Display for SetDisplayMessageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Set display message {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetDisplayMessageResponse {
    pub status: DisplayMessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub status_info: Option<StatusInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl SetDisplayMessageResponse {
    pub fn new(status: DisplayMessageStatus) -> Self {
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

impl ResponsePayload for SetDisplayMessageResponse {
    type Request = SetDisplayMessageRequest;

    fn failure(_request: &SetDisplayMessageRequest) -> Self {
        Self::new(DisplayMessageStatus::Rejected)
    }
}

impl fmt::Display for SetDisplayMessageResponse {
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
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::domain::{MessageContent, MessagePriority, MessageState};
    use crate::messages::{Request, RequestMeta, Response, ResponseMeta};
    use crate::shared::MessageError;

    #[test]
    fn parses_full_message() {
        let json = json!({
            "message": {
                "id": 10,
                "priority": "AlwaysFront",
                "state": "Charging",
                "startDateTime": "2026-03-01T08:00:00Z",
                "transactionId": "tx-77",
                "message": { "format": "UTF8", "language": "uz", "content": "Xush kelibsiz" },
                "messageExtra": [
                    { "format": "UTF8", "language": "en", "content": "Welcome" }
                ]
            }
        });
        let req =
            Request::<SetDisplayMessageRequest>::parse(&json, RequestMeta::default()).unwrap();
        let message = &req.payload.message;
        assert_eq!(message.state, Some(MessageState::Charging));
        assert_eq!(
            message.start_date_time,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(message.languages().collect::<Vec<_>>(), vec!["uz", "en"]);
        assert_eq!(
            req.to_string(),
            "Set display message #10 AlwaysFront UTF8 'Xush kelibsiz' (uz) while Charging \
             in transaction tx-77 (+1 translation(s))"
        );
    }

    #[test]
    fn inverted_display_period_fails_validation() {
        let err = Request::<SetDisplayMessageRequest>::parse(
            &json!({
                "message": {
                    "id": 1,
                    "priority": "InFront",
                    "startDateTime": "2026-03-02T00:00:00Z",
                    "endDateTime": "2026-03-01T00:00:00Z",
                    "message": { "format": "ASCII", "content": "x" }
                }
            }),
            RequestMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Validation { .. }));
    }

    #[test]
    fn empty_message_extra_is_rejected() {
        let err = Request::<SetDisplayMessageRequest>::parse(
            &json!({
                "message": {
                    "id": 2,
                    "priority": "NormalCycle",
                    "message": { "format": "ASCII", "content": "x" },
                    "messageExtra": []
                }
            }),
            RequestMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Validation { .. }));
    }

    #[test]
    fn parses_2_1_status_values() {
        let req = Request::to(
            Default::default(),
            SetDisplayMessageRequest::new(MessageInfo::new(
                1,
                MessagePriority::NormalCycle,
                MessageContent::utf8("hi").with_language("de"),
            )),
        );
        let resp = Response::<SetDisplayMessageResponse>::parse(
            &req,
            &json!({ "status": "LanguageNotSupported" }),
            ResponseMeta::for_request(&req.meta),
        )
        .unwrap();
        assert_eq!(resp.payload.status, DisplayMessageStatus::LanguageNotSupported);
        assert_eq!(resp.to_string(), "LanguageNotSupported");
    }

    #[test]
    fn failure_response_is_rejected() {
        let req = Request::to(
            Default::default(),
            SetDisplayMessageRequest::new(MessageInfo::new(
                1,
                MessagePriority::NormalCycle,
                MessageContent::utf8("hi"),
            )),
        );
        let resp = Response::<SetDisplayMessageResponse>::failed(&req, None);
        assert_eq!(resp.payload.status, DisplayMessageStatus::Rejected);
        assert!(!resp.is_ok());
    }
}
