//! OCPP 2.1 value objects shared by the message types
//!
//! Identifiers, routing metadata, result codes and the schema data types
//! (`StatusInfo`, `MessageInfo`, `IdToken`, ...) that several messages embed.

pub mod address;
pub mod component;
pub mod custom_data;
pub mod display;
pub mod identity;
pub mod ids;
pub mod result;
pub mod routing;
pub mod signature;
pub mod status;
pub mod status_info;
pub mod version;

pub use address::Address;
pub use component::{Component, Evse};
pub use custom_data::CustomData;
pub use display::{MessageContent, MessageFormat, MessageInfo, MessagePriority, MessageState};
pub use identity::{AdditionalInfo, CertificateHashData, HashAlgorithm, IdToken};
pub use ids::{EventTrackingId, NetworkingNodeId, RequestId};
pub use result::{OcppResult, ResultCode};
pub use routing::{NetworkPath, SourceRouting};
pub use signature::Signature;
pub use status::{
    ClearMessageStatus, CustomerInformationStatus, DisplayMessageStatus, GenericStatus,
    GetDisplayMessagesStatus,
};
pub use status_info::StatusInfo;
pub use version::OcppVersion;
