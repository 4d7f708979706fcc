//! Typed OCPP 2.1 messages
//!
//! Every action is modelled as a pair of payload types (`XxxRequest`,
//! `XxxResponse`) plus the generic envelopes [`Request`] and [`Response`],
//! which add what the JSON payload does not carry itself: correlation
//! metadata (request id, destination, network path, timestamps) and the
//! optional `signatures` extension.
//!
//! ```text
//!            parse(json, meta)                     to_json()
//! JSON ───────────────────────────► Request<P> ─────────────────► JSON
//!        serde + validator checks      │
//!                                      │ handler / peer
//!                                      ▼
//! JSON ◄─────────────────────────── Response<P::Response>
//!            to_json()           (or a failure response with a ResultCode)
//! ```

mod envelope;
pub mod inspect;

pub mod clear_display_message;
pub mod cost_updated;
pub mod customer_information;
pub mod get_display_messages;
pub mod notify_display_messages;
pub mod set_display_message;
pub mod vat_number_validation;

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

pub use envelope::{
    CustomParser, CustomSerializer, Request, RequestMeta, Response, ResponseMeta,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use inspect::{inspect, Inspection, MessageKind};

pub use clear_display_message::{ClearDisplayMessageRequest, ClearDisplayMessageResponse};
pub use cost_updated::{CostUpdatedRequest, CostUpdatedResponse};
pub use customer_information::{CustomerInformationRequest, CustomerInformationResponse};
pub use get_display_messages::{GetDisplayMessagesRequest, GetDisplayMessagesResponse};
pub use notify_display_messages::{NotifyDisplayMessagesRequest, NotifyDisplayMessagesResponse};
pub use set_display_message::{SetDisplayMessageRequest, SetDisplayMessageResponse};
pub use vat_number_validation::{VatNumberValidationRequest, VatNumberValidationResponse};

/// Who initiates an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDirection {
    CsmsToStation,
    StationToCsms,
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsmsToStation => write!(f, "CSMS → CS"),
            Self::StationToCsms => write!(f, "CS → CSMS"),
        }
    }
}

/// Common bounds of every JSON payload type.
pub trait Payload:
    Serialize
    + DeserializeOwned
    + Validate
    + Clone
    + fmt::Debug
    + fmt::Display
    + Eq
    + Hash
    + Send
    + Sync
    + 'static
{
}

impl<T> Payload for T where
    T: Serialize
        + DeserializeOwned
        + Validate
        + Clone
        + fmt::Debug
        + fmt::Display
        + Eq
        + Hash
        + Send
        + Sync
        + 'static
{
}

/// The payload of a Call.
pub trait RequestPayload: Payload {
    /// OCPP-J action name.
    const ACTION: &'static str;
    const DIRECTION: MessageDirection;

    type Response: ResponsePayload<Request = Self>;
}

/// The payload of a CallResult.
pub trait ResponsePayload: Payload {
    type Request: RequestPayload<Response = Self>;

    /// Payload carried by failure responses: the message's rejecting status
    /// (or nothing, for messages without one). The accompanying
    /// [`OcppResult`](crate::domain::OcppResult) says what actually failed.
    fn failure(request: &Self::Request) -> Self;
}

/// All actions implemented by this crate.
pub const ACTIONS: &[(&str, MessageDirection)] = &[
    (ClearDisplayMessageRequest::ACTION, ClearDisplayMessageRequest::DIRECTION),
    (CostUpdatedRequest::ACTION, CostUpdatedRequest::DIRECTION),
    (CustomerInformationRequest::ACTION, CustomerInformationRequest::DIRECTION),
    (GetDisplayMessagesRequest::ACTION, GetDisplayMessagesRequest::DIRECTION),
    (NotifyDisplayMessagesRequest::ACTION, NotifyDisplayMessagesRequest::DIRECTION),
    (SetDisplayMessageRequest::ACTION, SetDisplayMessageRequest::DIRECTION),
    (VatNumberValidationRequest::ACTION, VatNumberValidationRequest::DIRECTION),
];

/// Look up the direction of a known action.
pub fn direction_of(action: &str) -> Option<MessageDirection> {
    ACTIONS
        .iter()
        .find(|(name, _)| *name == action)
        .map(|(_, direction)| *direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_table_is_complete() {
        assert_eq!(ACTIONS.len(), 7);
        assert_eq!(
            direction_of("NotifyDisplayMessages"),
            Some(MessageDirection::StationToCsms)
        );
        assert_eq!(
            direction_of("SetDisplayMessage"),
            Some(MessageDirection::CsmsToStation)
        );
        assert_eq!(direction_of("Heartbeat"), None);
    }
}
