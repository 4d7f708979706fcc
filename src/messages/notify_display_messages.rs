//! NotifyDisplayMessages (CS → CSMS)
//!
//! Report of display messages in answer to GetDisplayMessages. Large reports
//! are split over several requests; every part except the last sets `tbc`.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::{CustomData, MessageInfo};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotifyDisplayMessagesRequest {
    /// The `requestId` of the GetDisplayMessages being answered.
    pub request_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1), nested)]
    pub message_info: Option<Vec<MessageInfo>>,
    /// "To be continued": more parts follow.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tbc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl NotifyDisplayMessagesRequest {
    pub fn new(request_id: i32, messages: Vec<MessageInfo>) -> Self {
        Self {
            request_id,
            message_info: (!messages.is_empty()).then_some(messages),
            tbc: false,
            custom_data: None,
        }
    }

    pub fn to_be_continued(mut self) -> Self {
        self.tbc = true;
        self
    }

    /// The reported messages; empty when the station has none matching.
    pub fn messages(&self) -> &[MessageInfo] {
        self.message_info.as_deref().unwrap_or_default()
    }
}

impl RequestPayload for NotifyDisplayMessagesRequest {
    const ACTION: &'static str = "NotifyDisplayMessages";
    const DIRECTION: MessageDirection = MessageDirection::StationToCsms;
    type Response = NotifyDisplayMessagesResponse;
}

impl fmt::Display for NotifyDisplayMessagesRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} display message(s) for request {}",
            self.messages().len(),
            self.request_id
        )?;
        if self.tbc {
            f.write_str(", more to follow")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotifyDisplayMessagesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl ResponsePayload for NotifyDisplayMessagesResponse {
    type Request = NotifyDisplayMessagesRequest;

    fn failure(_request: &NotifyDisplayMessagesRequest) -> Self {
        Self::default()
    }
}

impl fmt::Display for NotifyDisplayMessagesResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Display messages received")
    }
}
