//! Request correlation and dispatch on top of the typed messages
//!
//! The transport stays outside: it feeds received text frames into a
//! [`MessageDispatcher`] and implements [`FrameSink`] for outgoing ones.

pub mod dispatcher;
pub mod display_reports;
pub mod sender;

pub use dispatcher::{MessageDispatcher, MessageHandler};
pub use display_reports::{
    DisplayMessageReport, DisplayMessageReportStore, SharedDisplayMessageReportStore,
};
pub use sender::{FrameSink, RequestSender, SendError, SharedRequestSender};
