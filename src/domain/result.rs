//! Machine-readable outcome attached to every response
//!
//! A response that arrived and parsed cleanly carries [`ResultCode::Ok`].
//! Everything else (a CallError from the peer, a timeout, a payload that
//! failed validation) is still surfaced as a response, with the result code
//! describing what went wrong.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Outcome classes of a request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    /// Dropped by a local filter before reaching the peer.
    Filtered,
    /// The JSON did not match the message schema.
    FormationViolation,
    /// A signature was missing, malformed or did not verify.
    SignatureError,
    ProtocolError,
    Timeout,
    NetworkError,
    ServerError,
    NotImplemented,
    GenericError,
}

impl ResultCode {
    /// The OCPP-J RPC error code used when this result travels as a CallError.
    pub fn rpc_error_code(&self) -> &'static str {
        match self {
            Self::FormationViolation => "FormatViolation",
            Self::SignatureError => "SecurityError",
            Self::ProtocolError => "ProtocolError",
            Self::ServerError => "InternalError",
            Self::NotImplemented => "NotImplemented",
            Self::Ok
            | Self::Filtered
            | Self::Timeout
            | Self::NetworkError
            | Self::GenericError => "GenericError",
        }
    }

    /// Map an OCPP-J RPC error code received from a peer.
    pub fn from_rpc_error_code(code: &str) -> Self {
        match code {
            "FormatViolation"
            | "FormationViolation"
            | "OccurrenceConstraintViolation"
            | "PropertyConstraintViolation"
            | "TypeConstraintViolation" => Self::FormationViolation,
            "SecurityError" => Self::SignatureError,
            "ProtocolError" | "RpcFrameworkError" | "MessageTypeNotSupported" => {
                Self::ProtocolError
            }
            "NotImplemented" | "NotSupported" => Self::NotImplemented,
            "InternalError" => Self::ServerError,
            _ => Self::GenericError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Filtered => "Filtered",
            Self::FormationViolation => "FormationViolation",
            Self::SignatureError => "SignatureError",
            Self::ProtocolError => "ProtocolError",
            Self::Timeout => "Timeout",
            Self::NetworkError => "NetworkError",
            Self::ServerError => "ServerError",
            Self::NotImplemented => "NotImplemented",
            Self::GenericError => "GenericError",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result code plus optional human-readable description and JSON details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcppResult {
    pub code: ResultCode,
    pub description: Option<String>,
    pub details: Option<Value>,
}

impl OcppResult {
    pub fn new(code: ResultCode, description: Option<String>, details: Option<Value>) -> Self {
        Self {
            code,
            description,
            details,
        }
    }

    pub fn ok() -> Self {
        Self::new(ResultCode::Ok, None, None)
    }

    pub fn formation_violation(description: impl Into<String>) -> Self {
        Self::new(ResultCode::FormationViolation, Some(description.into()), None)
    }

    pub fn signature_error(description: impl Into<String>) -> Self {
        Self::new(ResultCode::SignatureError, Some(description.into()), None)
    }

    pub fn server(description: Option<String>) -> Self {
        Self::new(ResultCode::ServerError, description, None)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ResultCode::Timeout,
            Some(format!("No response after {} ms", after.as_millis())),
            None,
        )
    }

    pub fn network_error(description: impl Into<String>) -> Self {
        Self::new(ResultCode::NetworkError, Some(description.into()), None)
    }

    /// Wrap an error raised while producing or processing a response.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let mut chain = vec![error.to_string()];
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self::new(
            ResultCode::ServerError,
            Some(chain.join(": ")),
            None,
        )
    }

    /// Build a result from a CallError / CallResultError received on the wire.
    pub fn from_rpc_error(code: &str, description: &str, details: &Value) -> Self {
        let details = match details {
            Value::Object(map) if map.is_empty() => None,
            Value::Null => None,
            other => Some(other.clone()),
        };
        let description = if description.is_empty() {
            code.to_string()
        } else {
            format!("{}: {}", code, description)
        };
        Self::new(
            ResultCode::from_rpc_error_code(code),
            Some(description),
            details,
        )
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }
}

impl Default for OcppResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for OcppResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.code, description),
            None => write!(f, "{}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_codes_round_trip_for_wire_visible_results() {
        for code in [
            ResultCode::FormationViolation,
            ResultCode::SignatureError,
            ResultCode::ProtocolError,
            ResultCode::ServerError,
            ResultCode::NotImplemented,
            ResultCode::GenericError,
        ] {
            assert_eq!(ResultCode::from_rpc_error_code(code.rpc_error_code()), code);
        }
    }

    #[test]
    fn constraint_violations_map_to_formation_violation() {
        assert_eq!(
            ResultCode::from_rpc_error_code("OccurrenceConstraintViolation"),
            ResultCode::FormationViolation
        );
        assert_eq!(
            ResultCode::from_rpc_error_code("SomethingVendorSpecific"),
            ResultCode::GenericError
        );
    }

    #[test]
    fn from_rpc_error_drops_empty_details() {
        let result = OcppResult::from_rpc_error("NotImplemented", "", &serde_json::json!({}));
        assert_eq!(result.code, ResultCode::NotImplemented);
        assert_eq!(result.description.as_deref(), Some("NotImplemented"));
        assert!(result.details.is_none());
    }

    #[test]
    fn from_error_includes_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let result = OcppResult::from_error(&io);
        assert_eq!(result.code, ResultCode::ServerError);
        assert_eq!(result.description.as_deref(), Some("disk full"));
    }
}
