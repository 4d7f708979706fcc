//! Request/response envelopes: payload + correlation metadata + signatures

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use super::{Payload, RequestPayload, ResponsePayload};
use crate::domain::{
    EventTrackingId, NetworkPath, OcppResult, RequestId, ResultCode, Signature, SourceRouting,
};
use crate::shared::{MessageError, OcppFrame};

/// Timeout applied when the caller does not choose one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SIGNATURES_KEY: &str = "signatures";

/// Hook run after the built-in parser, receiving the raw JSON and the parsed
/// message. Used to pick up vendor extensions.
pub type CustomParser<T> = dyn Fn(&Value, T) -> T + Send + Sync;

/// Hook run after the built-in serializer, receiving the message and the
/// produced JSON.
pub type CustomSerializer<T> = dyn Fn(&T, Value) -> Value + Send + Sync;

// ── Metadata ───────────────────────────────────────────────────

/// Correlation metadata of an outgoing or received request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub request_id: RequestId,
    pub destination: SourceRouting,
    /// Nodes the request has travelled through so far.
    pub network_path: NetworkPath,
    pub timestamp: DateTime<Utc>,
    pub timeout: Duration,
    pub event_tracking_id: EventTrackingId,
}

impl RequestMeta {
    /// Fresh metadata: random ids, current time, default timeout.
    pub fn new(destination: SourceRouting) -> Self {
        Self {
            request_id: RequestId::random(),
            destination,
            network_path: NetworkPath::empty(),
            timestamp: Utc::now(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            event_tracking_id: EventTrackingId::random(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_network_path(mut self, network_path: NetworkPath) -> Self {
        self.network_path = network_path;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_event_tracking_id(mut self, event_tracking_id: EventTrackingId) -> Self {
        self.event_tracking_id = event_tracking_id;
        self
    }

    /// Point in time after which no response is expected anymore.
    pub fn deadline(&self) -> DateTime<Utc> {
        let timeout = chrono::Duration::from_std(self.timeout).unwrap_or(chrono::Duration::MAX);
        self.timestamp
            .checked_add_signed(timeout)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self::new(SourceRouting::zero())
    }
}

/// Correlation metadata of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Id of the request this response answers.
    pub request_id: RequestId,
    pub destination: SourceRouting,
    pub network_path: NetworkPath,
    pub timestamp: DateTime<Utc>,
    /// Time between sending the request and producing/receiving this response.
    pub runtime: Option<Duration>,
}

impl ResponseMeta {
    /// Metadata for answering `request`: addressed back to the request's
    /// origin, stamped now.
    pub fn for_request(request: &RequestMeta) -> Self {
        let now = Utc::now();
        let destination = match request.network_path.origin() {
            Some(origin) => SourceRouting::to(origin.clone()),
            None => SourceRouting::zero(),
        };
        Self {
            request_id: request.request_id.clone(),
            destination,
            network_path: NetworkPath::empty(),
            timestamp: now,
            runtime: (now - request.timestamp).to_std().ok(),
        }
    }

    pub fn with_network_path(mut self, network_path: NetworkPath) -> Self {
        self.network_path = network_path;
        self
    }
}

// ── Shared JSON plumbing ───────────────────────────────────────

pub(super) fn parse_payload<P: Payload>(
    action: &'static str,
    json: &Value,
) -> Result<(P, Vec<Signature>), MessageError> {
    let Value::Object(object) = json else {
        return Err(MessageError::NotAnObject { action });
    };

    let signatures = match object.get(SIGNATURES_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => parse_signatures(action, raw)?,
    };

    let payload = P::deserialize(json).map_err(|e| MessageError::Formation {
        action,
        reason: e.to_string(),
    })?;

    payload.validate().map_err(|e| MessageError::Validation {
        action,
        reason: e.to_string(),
    })?;

    Ok((payload, signatures))
}

fn parse_signatures(action: &'static str, raw: &Value) -> Result<Vec<Signature>, MessageError> {
    let signatures = Vec::<Signature>::deserialize(raw).map_err(|e| MessageError::Signature {
        action,
        reason: e.to_string(),
    })?;

    for signature in &signatures {
        signature
            .validate()
            .map_err(|e| MessageError::Signature {
                action,
                reason: e.to_string(),
            })?;
        signature
            .value_bytes()
            .map_err(|e| MessageError::Signature {
                action,
                reason: format!("value of key '{}' is not base64: {}", signature.key_id, e),
            })?;
    }

    Ok(signatures)
}

pub(super) fn parse_text(action: &'static str, text: &str) -> Result<Value, MessageError> {
    serde_json::from_str(text).map_err(|e| MessageError::InvalidJson {
        action,
        reason: e.to_string(),
    })
}

pub(super) fn payload_to_json<P: Payload>(payload: &P, signatures: &[Signature]) -> Value {
    // Derived Serialize impls with string keys cannot fail.
    let mut json = serde_json::to_value(payload).unwrap_or_default();
    if !signatures.is_empty() {
        if let Value::Object(object) = &mut json {
            object.insert(
                SIGNATURES_KEY.to_string(),
                serde_json::to_value(signatures).unwrap_or_default(),
            );
        }
    }
    json
}

// ── Request ────────────────────────────────────────────────────

/// A request payload together with its correlation metadata.
///
/// Equality and hashing cover the payload and signatures only; two requests
/// with identical content but different ids or timestamps compare equal.
#[derive(Debug, Clone)]
pub struct Request<P> {
    pub payload: P,
    pub meta: RequestMeta,
    pub signatures: Vec<Signature>,
}

impl<P: RequestPayload> Request<P> {
    pub fn new(payload: P, meta: RequestMeta) -> Self {
        Self {
            payload,
            meta,
            signatures: Vec::new(),
        }
    }

    /// Wrap `payload` in fresh metadata addressed to `destination`.
    pub fn to(destination: SourceRouting, payload: P) -> Self {
        Self::new(payload, RequestMeta::new(destination))
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn action(&self) -> &'static str {
        P::ACTION
    }

    pub fn request_id(&self) -> &RequestId {
        &self.meta.request_id
    }

    /// Parse a request payload received as a JSON object.
    pub fn parse(json: &Value, meta: RequestMeta) -> Result<Self, MessageError> {
        Self::parse_with(json, meta, None)
    }

    pub fn parse_with(
        json: &Value,
        meta: RequestMeta,
        custom_parser: Option<&CustomParser<Self>>,
    ) -> Result<Self, MessageError> {
        let (payload, signatures) = parse_payload::<P>(P::ACTION, json)?;
        let request = Self {
            payload,
            meta,
            signatures,
        };
        Ok(match custom_parser {
            Some(custom) => custom(json, request),
            None => request,
        })
    }

    /// Parse a request payload from JSON text.
    pub fn parse_text(text: &str, meta: RequestMeta) -> Result<Self, MessageError> {
        Self::parse(&parse_text(P::ACTION, text)?, meta)
    }

    pub fn to_json(&self) -> Value {
        self.to_json_with(None)
    }

    pub fn to_json_with(&self, custom_serializer: Option<&CustomSerializer<Self>>) -> Value {
        let json = payload_to_json(&self.payload, &self.signatures);
        match custom_serializer {
            Some(custom) => custom(self, json),
            None => json,
        }
    }

    /// The OCPP-J Call frame carrying this request.
    pub fn to_frame(&self) -> OcppFrame {
        OcppFrame::Call {
            message_id: self.meta.request_id.to_string(),
            action: P::ACTION.to_string(),
            payload: self.to_json(),
        }
    }
}

impl<P: PartialEq> PartialEq for Request<P> {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.signatures == other.signatures
    }
}

impl<P: Eq> Eq for Request<P> {}

impl<P: Hash> Hash for Request<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.payload.hash(state);
        self.signatures.hash(state);
    }
}

impl<P: fmt::Display> fmt::Display for Request<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.payload, f)
    }
}

// ── Response ───────────────────────────────────────────────────

/// A response payload together with its outcome and correlation metadata.
///
/// Equality and hashing cover the payload and signatures only.
#[derive(Debug, Clone)]
pub struct Response<P> {
    pub payload: P,
    pub result: OcppResult,
    pub meta: ResponseMeta,
    pub signatures: Vec<Signature>,
}

impl<P: ResponsePayload> Response<P> {
    /// A successful response to `request`.
    pub fn new(request: &Request<P::Request>, payload: P) -> Self {
        Self {
            payload,
            result: OcppResult::ok(),
            meta: ResponseMeta::for_request(&request.meta),
            signatures: Vec::new(),
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    // ── Failure factories ──────────────────────────────────

    /// A failure response with an arbitrary result code.
    pub fn request_error(
        request: &Request<P::Request>,
        code: ResultCode,
        description: Option<String>,
        details: Option<Value>,
    ) -> Self {
        Self::failure(request, OcppResult::new(code, description, details))
    }

    /// The request or its response did not match the message schema.
    pub fn formation_violation(
        request: &Request<P::Request>,
        description: impl Into<String>,
    ) -> Self {
        Self::failure(request, OcppResult::formation_violation(description))
    }

    /// A signature was missing, malformed or did not verify.
    pub fn signature_error(request: &Request<P::Request>, description: impl Into<String>) -> Self {
        Self::failure(request, OcppResult::signature_error(description))
    }

    /// Generic processing failure.
    pub fn failed(request: &Request<P::Request>, description: Option<String>) -> Self {
        Self::failure(request, OcppResult::server(description))
    }

    /// Processing the request raised an error.
    pub fn exception_occurred(
        request: &Request<P::Request>,
        error: &dyn std::error::Error,
    ) -> Self {
        Self::failure(request, OcppResult::from_error(error))
    }

    fn failure(request: &Request<P::Request>, result: OcppResult) -> Self {
        Self {
            payload: P::failure(&request.payload),
            result,
            meta: ResponseMeta::for_request(&request.meta),
            signatures: Vec::new(),
        }
    }

    // ── JSON ───────────────────────────────────────────────

    /// Parse the CallResult payload answering `request`.
    pub fn parse(
        request: &Request<P::Request>,
        json: &Value,
        meta: ResponseMeta,
    ) -> Result<Self, MessageError> {
        Self::parse_with(request, json, meta, None)
    }

    pub fn parse_with(
        request: &Request<P::Request>,
        json: &Value,
        meta: ResponseMeta,
        custom_parser: Option<&CustomParser<Self>>,
    ) -> Result<Self, MessageError> {
        let (payload, signatures) = parse_payload::<P>(request.action(), json)?;
        let response = Self {
            payload,
            result: OcppResult::ok(),
            meta,
            signatures,
        };
        Ok(match custom_parser {
            Some(custom) => custom(json, response),
            None => response,
        })
    }

    pub fn parse_text(
        request: &Request<P::Request>,
        text: &str,
        meta: ResponseMeta,
    ) -> Result<Self, MessageError> {
        let json = parse_text(request.action(), text)?;
        Self::parse(request, &json, meta)
    }

    pub fn to_json(&self) -> Value {
        self.to_json_with(None)
    }

    pub fn to_json_with(&self, custom_serializer: Option<&CustomSerializer<Self>>) -> Value {
        let json = payload_to_json(&self.payload, &self.signatures);
        match custom_serializer {
            Some(custom) => custom(self, json),
            None => json,
        }
    }

    /// The OCPP-J frame answering the request: a CallResult when the result
    /// is OK, a CallError carrying the result code otherwise.
    pub fn to_frame(&self) -> OcppFrame {
        let message_id = self.meta.request_id.to_string();
        if self.result.is_ok() {
            return OcppFrame::CallResult {
                message_id,
                payload: self.to_json(),
            };
        }
        OcppFrame::CallError {
            message_id,
            error_code: self.result.code.rpc_error_code().to_string(),
            error_description: self.result.description.clone().unwrap_or_default(),
            error_details: self
                .result
                .details
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

impl<P: PartialEq> PartialEq for Response<P> {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.signatures == other.signatures
    }
}

impl<P: Eq> Eq for Response<P> {}

impl<P: Hash> Hash for Response<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.payload.hash(state);
        self.signatures.hash(state);
    }
}

impl<P: fmt::Display> fmt::Display for Response<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.payload, f)?;
        if !self.result.is_ok() {
            write!(f, " [{}]", self.result)?;
        }
        Ok(())
    }
}
