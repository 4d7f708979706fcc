//! GetDisplayMessages (CSMS → CS)
//!
//! Queries the messages installed on a station, optionally filtered by id,
//! priority and state. Matching messages are delivered asynchronously in one
//! or more NotifyDisplayMessages requests carrying the same `requestId`.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{MessageDirection, RequestPayload, ResponsePayload};
use crate::domain::{
    CustomData, GetDisplayMessagesStatus, MessageInfo, MessagePriority, MessageState, StatusInfo,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_message_ids"))]
pub struct GetDisplayMessagesRequest {
    /// Only messages with these ids. When present, holds at least one id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<i32>>,
    /// Echoed in the NotifyDisplayMessages answers.
    pub request_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<MessagePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MessageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

fn validate_message_ids(request: &GetDisplayMessagesRequest) -> Result<(), ValidationError> {
    let Some(ids) = &request.id else {
        return Ok(());
    };
    if ids.is_empty() {
        let mut err = ValidationError::new("id");
        err.message = Some("id must contain at least one message id".into());
        return Err(err);
    }
    if ids.iter().any(|id| *id < 0) {
        let mut err = ValidationError::new("id");
        err.message = Some("message ids must not be negative".into());
        return Err(err);
    }
    Ok(())
}

impl GetDisplayMessagesRequest {
    /// All messages, unfiltered.
    pub fn all(request_id: i32) -> Self {
        Self {
            id: None,
            request_id,
            priority: None,
            state: None,
            custom_data: None,
        }
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.id = Some(ids.into_iter().collect());
        self
    }

    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_state(mut self, state: MessageState) -> Self {
        self.state = Some(state);
        self
    }

    /// Whether `info` passes every filter of this request.
    pub fn matches(&self, info: &MessageInfo) -> bool {
        self.id.as_ref().map_or(true, |ids| ids.contains(&info.id))
            && self.priority.map_or(true, |p| p == info.priority)
            && self.state.map_or(true, |s| info.state == Some(s))
    }
}

impl RequestPayload for GetDisplayMessagesRequest {
    const ACTION: &'static str = "GetDisplayMessages";
    const DIRECTION: MessageDirection = MessageDirection::CsmsToStation;
    type Response = GetDisplayMessagesResponse;
}

impl fmt::Display for GetDisplayMessagesRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Get display messages (request {})", self.request_id)?;
        if let Some(ids) = &self.id {
            let ids: Vec<String> = ids.iter().map(i32::to_string).collect();
            write!(f, " with id {}", ids.join(", "))?;
        }
        if let Some(priority) = self.priority {
            write!(f, " priority {}", priority)?;
        }
        if let Some(state) = self.state {
            write!(f, " state {}", state)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetDisplayMessagesResponse {
    pub status: GetDisplayMessagesStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub status_info: Option<StatusInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl GetDisplayMessagesResponse {
    pub fn new(status: GetDisplayMessagesStatus) -> Self {
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

impl ResponsePayload for GetDisplayMessagesResponse {
    type Request = GetDisplayMessagesRequest;

    /// The status enum has no rejecting value; `Unknown` means no report
    /// will follow.
    fn failure(_request: &GetDisplayMessagesRequest) -> Self {
        Self::new(GetDisplayMessagesStatus::Unknown)
    }
}

impl fmt::Display for GetDisplayMessagesResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(info) = &self.status_info {
            write!(f, " ({})", info)?;
        }
        Ok(())
    }
}
