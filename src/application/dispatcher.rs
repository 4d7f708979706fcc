//! Incoming frame dispatch
//!
//! One [`MessageDispatcher`] serves one connection. It parses raw OCPP-J
//! frames, routes Calls by action to a [`MessageHandler`] and hands
//! CallResult / CallError frames to the [`RequestSender`] that is waiting
//! for them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use super::sender::SharedRequestSender;
use crate::config::{ProtocolConfig, SignaturePolicy};
use crate::domain::{NetworkPath, NetworkingNodeId, OcppVersion, ResultCode, SourceRouting};
use crate::messages::{
    direction_of, ClearDisplayMessageRequest, ClearDisplayMessageResponse, CostUpdatedRequest,
    CostUpdatedResponse, CustomerInformationRequest, CustomerInformationResponse,
    GetDisplayMessagesRequest, GetDisplayMessagesResponse, MessageDirection,
    NotifyDisplayMessagesRequest, NotifyDisplayMessagesResponse, Request, RequestMeta,
    RequestPayload, Response, SetDisplayMessageRequest, SetDisplayMessageResponse,
    VatNumberValidationRequest, VatNumberValidationResponse,
};
use crate::shared::{MessageError, OcppFrame};

/// Answers incoming requests. Every action defaults to `NotImplemented`;
/// a station implements the CSMS → CS actions, a CSMS the CS → CSMS ones.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn clear_display_message(
        &self,
        request: Request<ClearDisplayMessageRequest>,
    ) -> Response<ClearDisplayMessageResponse> {
        not_implemented(&request)
    }

    async fn cost_updated(
        &self,
        request: Request<CostUpdatedRequest>,
    ) -> Response<CostUpdatedResponse> {
        not_implemented(&request)
    }

    async fn customer_information(
        &self,
        request: Request<CustomerInformationRequest>,
    ) -> Response<CustomerInformationResponse> {
        not_implemented(&request)
    }

    async fn get_display_messages(
        &self,
        request: Request<GetDisplayMessagesRequest>,
    ) -> Response<GetDisplayMessagesResponse> {
        not_implemented(&request)
    }

    async fn set_display_message(
        &self,
        request: Request<SetDisplayMessageRequest>,
    ) -> Response<SetDisplayMessageResponse> {
        not_implemented(&request)
    }

    async fn notify_display_messages(
        &self,
        request: Request<NotifyDisplayMessagesRequest>,
    ) -> Response<NotifyDisplayMessagesResponse> {
        not_implemented(&request)
    }

    async fn vat_number_validation(
        &self,
        request: Request<VatNumberValidationRequest>,
    ) -> Response<VatNumberValidationResponse> {
        not_implemented(&request)
    }
}

fn not_implemented<P: RequestPayload>(request: &Request<P>) -> Response<P::Response> {
    Response::<P::Response>::request_error(
        request,
        ResultCode::NotImplemented,
        Some(format!("{} is not implemented", P::ACTION)),
        None,
    )
}

pub struct MessageDispatcher<H> {
    /// The peer on the other end of this connection.
    node: NetworkingNodeId,
    /// Direction of the requests this side answers.
    accepts: MessageDirection,
    version: OcppVersion,
    signature_policy: SignaturePolicy,
    handler: Arc<H>,
    sender: Option<SharedRequestSender>,
}

impl<H: MessageHandler> MessageDispatcher<H> {
    /// Dispatcher of a station connected to `csms`.
    pub fn for_station(csms: impl Into<NetworkingNodeId>, handler: Arc<H>) -> Self {
        Self::new(csms.into(), MessageDirection::CsmsToStation, handler)
    }

    /// Dispatcher of a CSMS serving the connection of `station`.
    pub fn for_csms(station: impl Into<NetworkingNodeId>, handler: Arc<H>) -> Self {
        Self::new(station.into(), MessageDirection::StationToCsms, handler)
    }

    fn new(node: NetworkingNodeId, accepts: MessageDirection, handler: Arc<H>) -> Self {
        Self {
            node,
            accepts,
            version: OcppVersion::V21,
            signature_policy: SignaturePolicy::Ignore,
            handler,
            sender: None,
        }
    }

    /// Apply the `[protocol]` settings.
    pub fn configure(mut self, config: &ProtocolConfig) -> Self {
        self.version = config.version;
        self.signature_policy = config.signature_policy;
        self
    }

    /// Version negotiated for this connection; actions it lacks are
    /// answered with `NotImplemented`.
    pub fn with_version(mut self, version: OcppVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_signature_policy(mut self, policy: SignaturePolicy) -> Self {
        self.signature_policy = policy;
        self
    }

    /// Route CallResult / CallError frames to `sender`.
    pub fn with_sender(mut self, sender: SharedRequestSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn node(&self) -> &NetworkingNodeId {
        &self.node
    }

    /// Handle one text frame; returns the reply frame, if any.
    pub async fn handle_text(&self, text: &str) -> Option<String> {
        match OcppFrame::parse(text) {
            Ok(frame) => self.handle_frame(frame).await.map(|reply| reply.serialize()),
            Err(e) => {
                error!(
                    node = self.node.as_str(),
                    error = %e,
                    raw = text,
                    "Failed to parse OCPP frame"
                );
                // Without a message id there is nothing to answer to.
                let message_id = raw_message_id(text)?;
                let reply =
                    OcppFrame::error_response(message_id, "RpcFrameworkError", e.to_string());
                Some(reply.serialize())
            }
        }
    }

    pub async fn handle_frame(&self, frame: OcppFrame) -> Option<OcppFrame> {
        match frame {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => {
                info!(
                    node = self.node.as_str(),
                    action = action.as_str(),
                    message_id = message_id.as_str(),
                    "Received Call"
                );
                Some(self.handle_call(&message_id, &action, &payload).await)
            }

            OcppFrame::Send {
                message_id,
                action,
                payload,
            } => {
                info!(node = self.node.as_str(), action = action.as_str(), "Received Send");
                let reply = self.handle_call(&message_id, &action, &payload).await;
                if let OcppFrame::CallError { error_code, .. } = reply {
                    warn!(
                        node = self.node.as_str(),
                        action = action.as_str(),
                        error_code = error_code.as_str(),
                        "Unconfirmed message failed"
                    );
                }
                None
            }

            OcppFrame::CallResult {
                message_id,
                payload,
            } => {
                match &self.sender {
                    Some(sender) => {
                        sender.handle_result(&self.node, &message_id, payload);
                    }
                    None => warn!(
                        node = self.node.as_str(),
                        message_id = message_id.as_str(),
                        "CallResult without a request sender"
                    ),
                }
                None
            }

            OcppFrame::CallError {
                message_id,
                error_code,
                error_description,
                error_details,
            } => {
                match &self.sender {
                    Some(sender) => {
                        sender.handle_error(
                            &self.node,
                            &message_id,
                            &error_code,
                            &error_description,
                            error_details,
                        );
                    }
                    None => warn!(
                        node = self.node.as_str(),
                        message_id = message_id.as_str(),
                        error_code = error_code.as_str(),
                        "CallError without a request sender"
                    ),
                }
                None
            }

            OcppFrame::CallResultError {
                message_id,
                error_code,
                error_description,
                ..
            } => {
                warn!(
                    node = self.node.as_str(),
                    message_id = message_id.as_str(),
                    error_code = error_code.as_str(),
                    error_description = error_description.as_str(),
                    "Peer rejected our CallResult"
                );
                None
            }
        }
    }

    async fn handle_call(&self, message_id: &str, action: &str, payload: &Value) -> OcppFrame {
        match direction_of(action) {
            None => {
                warn!(node = self.node.as_str(), action, "Unknown action");
                return error_frame(message_id, &MessageError::UnknownAction(action.to_string()));
            }
            Some(direction) if direction != self.accepts => {
                warn!(
                    node = self.node.as_str(),
                    action,
                    %direction,
                    "Action sent in the wrong direction"
                );
                let err = MessageError::WrongDirection {
                    action: action.to_string(),
                    expected: "request this side answers",
                };
                return error_frame(message_id, &err);
            }
            Some(_) => {}
        }
        if !self.version.supports_action(action) {
            warn!(
                node = self.node.as_str(),
                action,
                version = %self.version,
                "Action not in protocol version"
            );
            return error_frame(message_id, &MessageError::UnknownAction(action.to_string()));
        }

        let meta = self.request_meta(message_id);
        match action {
            "ClearDisplayMessage" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.clear_display_message(request).await.to_frame(),
                Err(frame) => frame,
            },
            "CostUpdated" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.cost_updated(request).await.to_frame(),
                Err(frame) => frame,
            },
            "CustomerInformation" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.customer_information(request).await.to_frame(),
                Err(frame) => frame,
            },
            "GetDisplayMessages" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.get_display_messages(request).await.to_frame(),
                Err(frame) => frame,
            },
            "SetDisplayMessage" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.set_display_message(request).await.to_frame(),
                Err(frame) => frame,
            },
            "NotifyDisplayMessages" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.notify_display_messages(request).await.to_frame(),
                Err(frame) => frame,
            },
            "VatNumberValidation" => match self.parse(message_id, payload, meta) {
                Ok(request) => self.handler.vat_number_validation(request).await.to_frame(),
                Err(frame) => frame,
            },
            other => error_frame(message_id, &MessageError::UnknownAction(other.to_string())),
        }
    }

    /// Metadata of a request received from the peer: its path starts at the
    /// peer, so responses are addressed back to it.
    fn request_meta(&self, message_id: &str) -> RequestMeta {
        RequestMeta::new(SourceRouting::zero())
            .with_request_id(message_id)
            .with_network_path(NetworkPath::from_nodes([self.node.clone()]))
    }

    fn parse<P: RequestPayload>(
        &self,
        message_id: &str,
        payload: &Value,
        meta: RequestMeta,
    ) -> Result<Request<P>, OcppFrame> {
        let request = Request::<P>::parse(payload, meta).and_then(|request| {
            match self.signature_policy {
                SignaturePolicy::Require if request.signatures.is_empty() => {
                    Err(MessageError::Signature {
                        action: P::ACTION,
                        reason: "request is not signed".to_string(),
                    })
                }
                _ => Ok(request),
            }
        });
        request.map_err(|e| {
            warn!(
                node = self.node.as_str(),
                action = P::ACTION,
                message_id,
                error = %e,
                "Rejecting request"
            );
            error_frame(message_id, &e)
        })
    }
}

fn error_frame(message_id: &str, err: &MessageError) -> OcppFrame {
    OcppFrame::error_response(message_id, err.result_code().rpc_error_code(), err.to_string())
}

/// The message id of a frame that failed to parse, when it has one.
fn raw_message_id(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    value.get(1)?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::application::display_reports::DisplayMessageReportStore;
    use crate::application::sender::{FrameSink, RequestSender, SendError};
    use crate::domain::{
        Address, ClearMessageStatus, DisplayMessageStatus, GenericStatus, MessageInfo,
    };

    #[derive(Default)]
    struct Station {
        messages: std::sync::Mutex<Vec<MessageInfo>>,
    }

    #[async_trait]
    impl MessageHandler for Station {
        async fn set_display_message(
            &self,
            request: Request<SetDisplayMessageRequest>,
        ) -> Response<SetDisplayMessageResponse> {
            let mut messages = self.messages.lock().unwrap();
            messages.retain(|m| m.id != request.payload.message.id);
            messages.push(request.payload.message.clone());
            Response::new(&request, SetDisplayMessageResponse::new(DisplayMessageStatus::Accepted))
        }

        async fn clear_display_message(
            &self,
            request: Request<ClearDisplayMessageRequest>,
        ) -> Response<ClearDisplayMessageResponse> {
            let mut messages = self.messages.lock().unwrap();
            let before = messages.len();
            messages.retain(|m| m.id != request.payload.id);
            let status = if messages.len() < before {
                ClearMessageStatus::Accepted
            } else {
                ClearMessageStatus::Unknown
            };
            Response::new(&request, ClearDisplayMessageResponse::new(status))
        }
    }

    #[derive(Default)]
    struct Csms {
        reports: DisplayMessageReportStore,
    }

    #[async_trait]
    impl MessageHandler for Csms {
        async fn notify_display_messages(
            &self,
            request: Request<NotifyDisplayMessagesRequest>,
        ) -> Response<NotifyDisplayMessagesResponse> {
            if let Some(origin) = request.meta.network_path.origin() {
                self.reports.append(origin, &request.payload);
            }
            Response::new(&request, NotifyDisplayMessagesResponse::default())
        }

        async fn vat_number_validation(
            &self,
            request: Request<VatNumberValidationRequest>,
        ) -> Response<VatNumberValidationResponse> {
            let company = Address {
                name: "Texnouz LLC".into(),
                address1: "Amir Temur 1".into(),
                address2: None,
                city: "Tashkent".into(),
                postal_code: None,
                country: "UZ".into(),
                custom_data: None,
            };
            let payload = VatNumberValidationResponse::accepted(&request.payload, company);
            Response::new(&request, payload)
        }
    }

    fn reply(text: Option<String>) -> Value {
        serde_json::from_str(&text.expect("a reply frame")).unwrap()
    }

    #[tokio::test]
    async fn station_answers_set_and_clear() {
        let station = Arc::new(Station::default());
        let dispatcher = MessageDispatcher::for_station("CSMS", station.clone());

        let set = json!([2, "m-1", "SetDisplayMessage", {
            "message": {
                "id": 4,
                "priority": "InFront",
                "message": { "format": "UTF8", "content": "Hello" }
            }
        }]);
        let answer = reply(dispatcher.handle_text(&set.to_string()).await);
        assert_eq!(answer, json!([3, "m-1", { "status": "Accepted" }]));
        assert_eq!(station.messages.lock().unwrap().len(), 1);

        let clear = json!([2, "m-2", "ClearDisplayMessage", { "id": 4 }]);
        let answer = reply(dispatcher.handle_text(&clear.to_string()).await);
        assert_eq!(answer, json!([3, "m-2", { "status": "Accepted" }]));

        let answer = reply(dispatcher.handle_text(&clear.to_string()).await);
        assert_eq!(answer, json!([3, "m-2", { "status": "Unknown" }]));
    }

    #[tokio::test]
    async fn unimplemented_action_returns_not_implemented() {
        let dispatcher = MessageDispatcher::for_station("CSMS", Arc::new(Station::default()));
        let call = json!([2, "m-3", "CostUpdated", { "totalCost": 1.5, "transactionId": "tx" }]);

        let answer = reply(dispatcher.handle_text(&call.to_string()).await);
        assert_eq!(answer[0], json!(4));
        assert_eq!(answer[1], json!("m-3"));
        assert_eq!(answer[2], json!("NotImplemented"));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_format_violation() {
        let dispatcher = MessageDispatcher::for_station("CSMS", Arc::new(Station::default()));
        let call = json!([2, "m-4", "ClearDisplayMessage", { "id": "four" }]);

        let answer = reply(dispatcher.handle_text(&call.to_string()).await);
        assert_eq!(answer[0], json!(4));
        assert_eq!(answer[2], json!("FormatViolation"));
    }

    #[tokio::test]
    async fn unknown_and_misdirected_actions_are_rejected() {
        let dispatcher = MessageDispatcher::for_station("CSMS", Arc::new(Station::default()));

        let unknown = json!([2, "m-5", "Heartbeat", {}]);
        let answer = reply(dispatcher.handle_text(&unknown.to_string()).await);
        assert_eq!(answer[2], json!("NotImplemented"));

        let misdirected = json!([2, "m-6", "VatNumberValidation", { "vatNumber": "X" }]);
        let answer = reply(dispatcher.handle_text(&misdirected.to_string()).await);
        assert_eq!(answer[2], json!("ProtocolError"));
    }

    #[tokio::test]
    async fn broken_frames_get_rpc_framework_errors() {
        let dispatcher = MessageDispatcher::for_station("CSMS", Arc::new(Station::default()));

        let answer = reply(dispatcher.handle_text(r#"[9, "m-7", {}]"#).await);
        assert_eq!(answer[1], json!("m-7"));
        assert_eq!(answer[2], json!("RpcFrameworkError"));

        assert_eq!(dispatcher.handle_text("not json").await, None);
    }

    #[tokio::test]
    async fn csms_aggregates_display_reports() {
        let csms = Arc::new(Csms::default());
        let dispatcher = MessageDispatcher::for_csms("CS-1", csms.clone());

        let part = |id: &str, msg: i32, tbc: bool| {
            json!([2, id, "NotifyDisplayMessages", {
                "requestId": 11,
                "tbc": tbc,
                "messageInfo": [{
                    "id": msg,
                    "priority": "NormalCycle",
                    "message": { "format": "ASCII", "content": "x" }
                }]
            }])
            .to_string()
        };

        let answer = reply(dispatcher.handle_text(&part("n-1", 1, true)).await);
        assert_eq!(answer, json!([3, "n-1", {}]));
        reply(dispatcher.handle_text(&part("n-2", 2, false)).await);

        let report = csms
            .reports
            .get_report(&NetworkingNodeId::from("CS-1"), 11)
            .unwrap();
        assert!(!report.in_progress);
        assert_eq!(report.messages.len(), 2);
    }

    #[tokio::test]
    async fn csms_validates_vat_numbers() {
        let dispatcher = MessageDispatcher::for_csms("CS-1", Arc::new(Csms::default()));
        let call = json!([2, "v-1", "VatNumberValidation", { "vatNumber": "UZ123", "evseId": 1 }]);

        let answer = reply(dispatcher.handle_text(&call.to_string()).await);
        assert_eq!(answer[2]["status"], json!("Accepted"));
        assert_eq!(answer[2]["vatNumber"], json!("UZ123"));
        assert_eq!(answer[2]["company"]["city"], json!("Tashkent"));
        let status: GenericStatus = serde_json::from_value(answer[2]["status"].clone()).unwrap();
        assert_eq!(status, GenericStatus::Accepted);
    }

    #[tokio::test]
    async fn send_frames_are_not_answered() {
        let csms = Arc::new(Csms::default());
        let dispatcher = MessageDispatcher::for_csms("CS-1", csms.clone());
        let send = json!([6, "s-1", "NotifyDisplayMessages", { "requestId": 2 }]);

        assert_eq!(dispatcher.handle_text(&send.to_string()).await, None);
        assert!(csms
            .reports
            .get_report(&NetworkingNodeId::from("CS-1"), 2)
            .is_some());
    }

    #[tokio::test]
    async fn version_2_0_1_lacks_vat_number_validation() {
        let dispatcher = MessageDispatcher::for_csms("CS-1", Arc::new(Csms::default()))
            .with_version(OcppVersion::V201);
        let call = json!([2, "v-2", "VatNumberValidation", { "vatNumber": "UZ123" }]);

        let answer = reply(dispatcher.handle_text(&call.to_string()).await);
        assert_eq!(answer[2], json!("NotImplemented"));
    }

    #[tokio::test]
    async fn require_policy_rejects_unsigned_requests() {
        let config = ProtocolConfig {
            signature_policy: SignaturePolicy::Require,
            ..ProtocolConfig::default()
        };
        let dispatcher =
            MessageDispatcher::for_station("CSMS", Arc::new(Station::default())).configure(&config);

        let unsigned = json!([2, "m-8", "ClearDisplayMessage", { "id": 1 }]);
        let answer = reply(dispatcher.handle_text(&unsigned.to_string()).await);
        assert_eq!(answer[2], json!("SecurityError"));

        let signed = json!([2, "m-9", "ClearDisplayMessage", {
            "id": 1,
            "signatures": [{ "keyId": "k1", "value": "c2lnbmF0dXJl" }]
        }]);
        let answer = reply(dispatcher.handle_text(&signed.to_string()).await);
        assert_eq!(answer, json!([3, "m-9", { "status": "Unknown" }]));
    }

    struct ChannelSink(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl FrameSink for ChannelSink {
        async fn send_frame(
            &self,
            _node: &NetworkingNodeId,
            frame: String,
        ) -> Result<(), SendError> {
            self.0.send(frame).map_err(|e| SendError::Failed(e.to_string()))
        }
    }

    #[tokio::test]
    async fn call_results_reach_the_sender() {
        let (tx, mut frames) = mpsc::unbounded_channel();
        let sender = Arc::new(RequestSender::with_timeout(
            Arc::new(ChannelSink(tx)),
            Duration::from_secs(5),
        ));
        let dispatcher = MessageDispatcher::for_csms("CS-1", Arc::new(Csms::default()))
            .with_sender(sender.clone());

        let request = sender.request(SourceRouting::to("CS-1"), ClearDisplayMessageRequest::new(9));
        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(request).await }
        });

        let call = OcppFrame::parse(&frames.recv().await.unwrap()).unwrap();
        let result = json!([3, call.message_id(), { "status": "Rejected" }]);
        assert_eq!(dispatcher.handle_text(&result.to_string()).await, None);

        let response = task.await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.payload.status, ClearMessageStatus::Rejected);
    }
}
