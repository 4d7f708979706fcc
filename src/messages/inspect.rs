//! Untyped entry point: validate a payload given only its action name.
//!
//! Used by tooling that receives arbitrary JSON, e.g. the CLI.

use std::fmt;

use serde_json::Value;

use super::envelope::{parse_payload, payload_to_json};
use super::*;
use crate::shared::MessageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "request"),
            Self::Response => write!(f, "response"),
        }
    }
}

/// A validated payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub action: &'static str,
    pub kind: MessageKind,
    pub direction: MessageDirection,
    /// One-line rendering of the payload.
    pub summary: String,
    /// The payload as this crate serializes it.
    pub canonical: Value,
    pub signatures: usize,
}

/// Parse and validate `json` as the `kind` payload of `action`.
pub fn inspect(action: &str, kind: MessageKind, json: &Value) -> Result<Inspection, MessageError> {
    match (action, kind) {
        ("ClearDisplayMessage", MessageKind::Request) => {
            request::<ClearDisplayMessageRequest>(json)
        }
        ("ClearDisplayMessage", MessageKind::Response) => {
            response::<ClearDisplayMessageResponse>(json)
        }
        ("CostUpdated", MessageKind::Request) => request::<CostUpdatedRequest>(json),
        ("CostUpdated", MessageKind::Response) => response::<CostUpdatedResponse>(json),
        ("CustomerInformation", MessageKind::Request) => {
            request::<CustomerInformationRequest>(json)
        }
        ("CustomerInformation", MessageKind::Response) => {
            response::<CustomerInformationResponse>(json)
        }
        ("GetDisplayMessages", MessageKind::Request) => request::<GetDisplayMessagesRequest>(json),
        ("GetDisplayMessages", MessageKind::Response) => {
            response::<GetDisplayMessagesResponse>(json)
        }
        ("NotifyDisplayMessages", MessageKind::Request) => {
            request::<NotifyDisplayMessagesRequest>(json)
        }
        ("NotifyDisplayMessages", MessageKind::Response) => {
            response::<NotifyDisplayMessagesResponse>(json)
        }
        ("SetDisplayMessage", MessageKind::Request) => request::<SetDisplayMessageRequest>(json),
        ("SetDisplayMessage", MessageKind::Response) => {
            response::<SetDisplayMessageResponse>(json)
        }
        ("VatNumberValidation", MessageKind::Request) => {
            request::<VatNumberValidationRequest>(json)
        }
        ("VatNumberValidation", MessageKind::Response) => {
            response::<VatNumberValidationResponse>(json)
        }
        (other, _) => Err(MessageError::UnknownAction(other.to_string())),
    }
}

fn request<P: RequestPayload>(json: &Value) -> Result<Inspection, MessageError> {
    let (payload, signatures) = parse_payload::<P>(P::ACTION, json)?;
    Ok(Inspection {
        action: P::ACTION,
        kind: MessageKind::Request,
        direction: P::DIRECTION,
        summary: payload.to_string(),
        canonical: payload_to_json(&payload, &signatures),
        signatures: signatures.len(),
    })
}

fn response<P: ResponsePayload>(json: &Value) -> Result<Inspection, MessageError> {
    let action = <P::Request as RequestPayload>::ACTION;
    let (payload, signatures) = parse_payload::<P>(action, json)?;
    Ok(Inspection {
        action,
        kind: MessageKind::Response,
        direction: <P::Request as RequestPayload>::DIRECTION,
        summary: payload.to_string(),
        canonical: payload_to_json(&payload, &signatures),
        signatures: signatures.len(),
    })
}
