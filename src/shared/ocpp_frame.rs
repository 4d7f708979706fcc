//! OCPP-J message framing
//!
//! Implements the OCPP-J (JSON over WebSocket) RPC envelope as used by OCPP 2.1:
//!
//! - **Call**            `[2, "<messageId>", "<action>", {<payload>}]`
//! - **CallResult**      `[3, "<messageId>", {<payload>}]`
//! - **CallError**       `[4, "<messageId>", "<errorCode>", "<errorDescription>", {<errorDetails>}]`
//! - **CallResultError** `[5, "<messageId>", "<errorCode>", "<errorDescription>", {<errorDetails>}]`
//! - **Send**            `[6, "<messageId>", "<action>", {<payload>}]`
//!
//! `CallResultError` and `Send` are new in 2.1: the former reports that a
//! CallResult could not be processed, the latter is an unconfirmed message.

use serde_json::Value;
use thiserror::Error;

// ── Message-type constants ─────────────────────────────────────

const MSG_TYPE_CALL: u64 = 2;
const MSG_TYPE_CALL_RESULT: u64 = 3;
const MSG_TYPE_CALL_ERROR: u64 = 4;
const MSG_TYPE_CALL_RESULT_ERROR: u64 = 5;
const MSG_TYPE_SEND: u64 = 6;

/// Message ids are limited to 36 characters by OCPP-J.
pub const MAX_MESSAGE_ID_LEN: usize = 36;

// ── OcppFrame ──────────────────────────────────────────────────

/// A parsed OCPP-J frame.
#[derive(Debug, Clone, PartialEq)]
pub enum OcppFrame {
    /// `[2, messageId, action, payload]`
    Call {
        message_id: String,
        action: String,
        payload: Value,
    },
    /// `[3, messageId, payload]`
    CallResult { message_id: String, payload: Value },
    /// `[4, messageId, errorCode, errorDescription, errorDetails]`
    CallError {
        message_id: String,
        error_code: String,
        error_description: String,
        error_details: Value,
    },
    /// `[5, messageId, errorCode, errorDescription, errorDetails]`
    CallResultError {
        message_id: String,
        error_code: String,
        error_description: String,
        error_details: Value,
    },
    /// `[6, messageId, action, payload]`
    Send {
        message_id: String,
        action: String,
        payload: Value,
    },
}

impl OcppFrame {
    // ── Parsing ────────────────────────────────────────────

    /// Parse raw JSON text into an `OcppFrame`.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| FrameError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Interpret an already-decoded JSON value as an `OcppFrame`.
    pub fn from_value(value: Value) -> Result<Self, FrameError> {
        let Value::Array(arr) = value else {
            return Err(FrameError::NotAnArray);
        };

        let msg_type = arr
            .first()
            .ok_or(FrameError::EmptyArray)?
            .as_u64()
            .ok_or(FrameError::InvalidMessageType)?;

        match msg_type {
            MSG_TYPE_CALL | MSG_TYPE_SEND => Self::parse_action_frame(msg_type, arr),
            MSG_TYPE_CALL_RESULT => Self::parse_call_result(arr),
            MSG_TYPE_CALL_ERROR | MSG_TYPE_CALL_RESULT_ERROR => {
                Self::parse_error_frame(msg_type, arr)
            }
            _ => Err(FrameError::UnknownMessageType(msg_type)),
        }
    }

    fn parse_action_frame(msg_type: u64, arr: Vec<Value>) -> Result<Self, FrameError> {
        if arr.len() < 4 {
            return Err(FrameError::MissingFields {
                expected: 4,
                got: arr.len(),
            });
        }

        let mut fields = arr.into_iter().skip(1);
        let message_id = message_id(fields.next())?;
        let action = fields
            .next()
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or(FrameError::FieldTypeMismatch("action must be a string"))?;
        let payload = fields.next().unwrap_or_default();

        Ok(if msg_type == MSG_TYPE_CALL {
            Self::Call {
                message_id,
                action,
                payload,
            }
        } else {
            Self::Send {
                message_id,
                action,
                payload,
            }
        })
    }

    fn parse_call_result(arr: Vec<Value>) -> Result<Self, FrameError> {
        if arr.len() < 3 {
            return Err(FrameError::MissingFields {
                expected: 3,
                got: arr.len(),
            });
        }

        let mut fields = arr.into_iter().skip(1);
        let message_id = message_id(fields.next())?;
        let payload = match fields.next() {
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(v) => v,
        };

        Ok(Self::CallResult {
            message_id,
            payload,
        })
    }

    fn parse_error_frame(msg_type: u64, arr: Vec<Value>) -> Result<Self, FrameError> {
        if arr.len() < 3 {
            return Err(FrameError::MissingFields {
                expected: 3,
                got: arr.len(),
            });
        }

        let mut fields = arr.into_iter().skip(1);
        let message_id = message_id(fields.next())?;
        let error_code = fields
            .next()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "GenericError".to_string());
        let error_description = fields
            .next()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let error_details = match fields.next() {
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(v) => v,
        };

        Ok(if msg_type == MSG_TYPE_CALL_ERROR {
            Self::CallError {
                message_id,
                error_code,
                error_description,
                error_details,
            }
        } else {
            Self::CallResultError {
                message_id,
                error_code,
                error_description,
                error_details,
            }
        })
    }

    // ── Serialization ──────────────────────────────────────

    /// Project this frame into its JSON array form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Call {
                message_id,
                action,
                payload,
            } => Value::Array(vec![
                MSG_TYPE_CALL.into(),
                message_id.as_str().into(),
                action.as_str().into(),
                payload.clone(),
            ]),

            Self::Send {
                message_id,
                action,
                payload,
            } => Value::Array(vec![
                MSG_TYPE_SEND.into(),
                message_id.as_str().into(),
                action.as_str().into(),
                payload.clone(),
            ]),

            Self::CallResult {
                message_id,
                payload,
            } => Value::Array(vec![
                MSG_TYPE_CALL_RESULT.into(),
                message_id.as_str().into(),
                payload.clone(),
            ]),

            Self::CallError {
                message_id,
                error_code,
                error_description,
                error_details,
            } => Value::Array(vec![
                MSG_TYPE_CALL_ERROR.into(),
                message_id.as_str().into(),
                error_code.as_str().into(),
                error_description.as_str().into(),
                error_details.clone(),
            ]),

            Self::CallResultError {
                message_id,
                error_code,
                error_description,
                error_details,
            } => Value::Array(vec![
                MSG_TYPE_CALL_RESULT_ERROR.into(),
                message_id.as_str().into(),
                error_code.as_str().into(),
                error_description.as_str().into(),
                error_details.clone(),
            ]),
        }
    }

    /// Serialize this frame to a JSON string.
    pub fn serialize(&self) -> String {
        self.to_value().to_string()
    }

    // ── Helpers ────────────────────────────────────────────

    /// Get the message id.
    pub fn message_id(&self) -> &str {
        match self {
            Self::Call { message_id, .. }
            | Self::CallResult { message_id, .. }
            | Self::CallError { message_id, .. }
            | Self::CallResultError { message_id, .. }
            | Self::Send { message_id, .. } => message_id,
        }
    }

    /// Create a `CallError` response for a given message id.
    pub fn error_response(
        message_id: impl Into<String>,
        error_code: impl Into<String>,
        error_description: impl Into<String>,
    ) -> Self {
        Self::CallError {
            message_id: message_id.into(),
            error_code: error_code.into(),
            error_description: error_description.into(),
            error_details: Value::Object(Default::default()),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call { .. })
    }

    pub fn is_call_result(&self) -> bool {
        matches!(self, Self::CallResult { .. })
    }

    pub fn is_call_error(&self) -> bool {
        matches!(self, Self::CallError { .. })
    }
}

fn message_id(field: Option<Value>) -> Result<String, FrameError> {
    let id = field
        .and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .ok_or(FrameError::FieldTypeMismatch("messageId must be a string"))?;

    if id.is_empty() || id.chars().count() > MAX_MESSAGE_ID_LEN {
        return Err(FrameError::InvalidMessageId(id));
    }
    Ok(id)
}

// ── Errors ─────────────────────────────────────────────────────

/// Errors produced while decoding an OCPP-J frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Frame is not a JSON array")]
    NotAnArray,
    #[error("Empty JSON array")]
    EmptyArray,
    #[error("Message type is not a number")]
    InvalidMessageType,
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u64),
    #[error("Expected at least {expected} fields, got {got}")]
    MissingFields { expected: usize, got: usize },
    #[error("Field type mismatch: {0}")]
    FieldTypeMismatch(&'static str),
    #[error("Invalid message id: {0:?}")]
    InvalidMessageId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_call() {
        let text = r#"[2,"abc123","ClearDisplayMessage",{"id":7}]"#;
        let frame = OcppFrame::parse(text).unwrap();
        match frame {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => {
                assert_eq!(message_id, "abc123");
                assert_eq!(action, "ClearDisplayMessage");
                assert_eq!(payload["id"], 7);
            }
            _ => panic!("Expected Call frame"),
        }
    }

    #[test]
    fn parse_call_result_with_null_payload() {
        let frame = OcppFrame::parse(r#"[3,"abc123",null]"#).unwrap();
        assert_eq!(
            frame,
            OcppFrame::CallResult {
                message_id: "abc123".into(),
                payload: serde_json::json!({}),
            }
        );
    }

    #[test]
    fn parse_call_error() {
        let text = r#"[4,"abc123","NotImplemented","Action not supported",{}]"#;
        match OcppFrame::parse(text).unwrap() {
            OcppFrame::CallError {
                message_id,
                error_code,
                error_description,
                ..
            } => {
                assert_eq!(message_id, "abc123");
                assert_eq!(error_code, "NotImplemented");
                assert_eq!(error_description, "Action not supported");
            }
            _ => panic!("Expected CallError frame"),
        }
    }

    #[test]
    fn parse_call_result_error_and_send() {
        let frame =
            OcppFrame::parse(r#"[5,"r1","FormationViolation","bad result",{}]"#).unwrap();
        assert!(matches!(frame, OcppFrame::CallResultError { .. }));

        let frame = OcppFrame::parse(r#"[6,"s1","NotifyPeriodicEventStream",{"id":1}]"#).unwrap();
        assert!(matches!(
            frame,
            OcppFrame::Send { ref action, .. } if action == "NotifyPeriodicEventStream"
        ));
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(
            OcppFrame::parse("not json"),
            Err(FrameError::InvalidJson(_))
        ));
        assert_eq!(OcppFrame::parse("{}"), Err(FrameError::NotAnArray));
        assert_eq!(OcppFrame::parse("[]"), Err(FrameError::EmptyArray));
        assert_eq!(
            OcppFrame::parse(r#"[9,"x",{}]"#),
            Err(FrameError::UnknownMessageType(9))
        );
        assert_eq!(
            OcppFrame::parse(r#"[2,"x","Action"]"#),
            Err(FrameError::MissingFields {
                expected: 4,
                got: 3
            })
        );
        assert_eq!(
            OcppFrame::parse(r#"[2,17,"Action",{}]"#),
            Err(FrameError::FieldTypeMismatch("messageId must be a string"))
        );
    }

    #[test]
    fn rejects_overlong_message_id() {
        let id = "x".repeat(MAX_MESSAGE_ID_LEN + 1);
        let text = format!(r#"[3,"{}",{{}}]"#, id);
        assert_eq!(
            OcppFrame::parse(&text),
            Err(FrameError::InvalidMessageId(id))
        );
    }

    #[test]
    fn error_response_serializes_with_empty_details() {
        let frame = OcppFrame::error_response("id3", "GenericError", "Something went wrong");
        assert_eq!(
            frame.serialize(),
            r#"[4,"id3","GenericError","Something went wrong",{}]"#
        );
        let parsed = OcppFrame::parse(&frame.serialize()).unwrap();
        assert!(parsed.is_call_error());
        assert_eq!(parsed.message_id(), "id3");
    }
}
