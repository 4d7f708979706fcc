//! # Texnouz OCPP 2.1 message layer
//!
//! Strongly typed OCPP 2.1 requests and responses for display messages,
//! cost updates, customer information and VAT number validation, plus the
//! plumbing a charging station or CSMS needs around them.
//!
//! ## Architecture
//!
//! - **domain**: Value objects shared by the messages (ids, routing
//!   metadata, result codes, `MessageInfo`, `IdToken`, ...)
//! - **messages**: Request/response payloads and their envelopes
//! - **shared**: OCPP-J framing and the error types
//! - **components**: Logical components of the device model
//!   (`SampledDataCtrlr`, `TariffCostCtrlr`)
//! - **application**: Request correlation and incoming frame dispatch
//! - **config** / **logging**: TOML configuration and tracing setup
//!
//! The WebSocket transport is not part of this crate; plug it in through
//! [`FrameSink`] and [`MessageDispatcher::handle_text`].

pub mod application;
pub mod components;
pub mod config;
pub mod domain;
pub mod logging;
pub mod messages;
pub mod shared;

pub use application::{FrameSink, MessageDispatcher, MessageHandler, RequestSender};
pub use config::{default_config_path, AppConfig};
pub use logging::init_tracing;
pub use messages::{Request, RequestMeta, RequestPayload, Response, ResponseMeta, ResponsePayload};
