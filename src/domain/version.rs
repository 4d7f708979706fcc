//! OCPP protocol version
//!
//! The messages in this crate follow the OCPP 2.1 schemas. OCPP 2.0.1
//! peers understand the same display-message and customer-information
//! messages, minus 2.1 additions such as `QRCODE` or VATNumberValidation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// OCPP versions a connection may negotiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OcppVersion {
    #[serde(rename = "2.0.1")]
    V201,
    #[serde(rename = "2.1")]
    V21,
}

impl OcppVersion {
    /// WebSocket subprotocol identifier for this OCPP version.
    ///
    /// Used in the `Sec-WebSocket-Protocol` header during handshake.
    pub fn subprotocol(&self) -> &'static str {
        match self {
            Self::V201 => "ocpp2.0.1",
            Self::V21 => "ocpp2.1",
        }
    }

    /// Parse an OCPP version from a WebSocket subprotocol string.
    pub fn from_subprotocol(s: &str) -> Option<Self> {
        match s.trim() {
            "ocpp2.0.1" => Some(Self::V201),
            "ocpp2.1" => Some(Self::V21),
            _ => None,
        }
    }

    /// Supported versions, newest first.
    pub const ALL: &'static [OcppVersion] = &[Self::V21, Self::V201];

    /// Pick the newest version offered by the peer that we support.
    pub fn negotiate<'a>(offered: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let offered: Vec<Self> = offered
            .into_iter()
            .filter_map(Self::from_subprotocol)
            .collect();
        Self::ALL.iter().copied().find(|v| offered.contains(v))
    }

    /// Whether `action` exists in this version.
    pub fn supports_action(&self, action: &str) -> bool {
        match self {
            Self::V21 => true,
            Self::V201 => action != "VatNumberValidation",
        }
    }

    /// Human-readable version string.
    pub fn version_string(&self) -> &'static str {
        match self {
            Self::V201 => "2.0.1",
            Self::V21 => "2.1",
        }
    }
}

impl fmt::Display for OcppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OCPP {}", self.version_string())
    }
}
