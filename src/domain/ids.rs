//! Identifier value objects
//!
//! Thin string newtypes so request ids, event tracking ids and networking
//! node ids can't be mixed up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// OCPP-J message id correlating a Call with its CallResult/CallError.
    RequestId
}

string_id! {
    /// Id following one logical event through logs across several messages.
    EventTrackingId
}

string_id! {
    /// Address of a charging station, local controller or CSMS in the
    /// networking-node overlay.
    NetworkingNodeId
}

impl RequestId {
    /// A fresh random id (UUID v4, 36 characters, the OCPP-J maximum).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl EventTrackingId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl NetworkingNodeId {
    /// The empty id addresses "whoever is on the other end of this
    /// connection".
    pub fn zero() -> Self {
        Self(String::new())
    }
}
