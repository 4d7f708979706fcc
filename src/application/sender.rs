//! Outgoing requests and response correlation
//!
//! ```text
//! caller ──► RequestSender::send(Request<P>) ──► FrameSink (transport)
//!                    │ pending[(node, messageId)]
//!                    ▼
//! MessageDispatcher ──► handle_result / handle_error ──► Response<P::Response>
//! ```
//!
//! Every outcome, including timeouts and transport failures, comes back as a
//! [`Response`] whose [`OcppResult`] says what happened.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ProtocolConfig;
use crate::domain::{NetworkingNodeId, OcppResult, ResultCode, SourceRouting};
use crate::messages::{
    Request, RequestMeta, RequestPayload, Response, ResponseMeta, DEFAULT_REQUEST_TIMEOUT,
};
use crate::shared::OcppFrame;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("networking node not connected: {0}")]
    NotConnected(String),
    #[error("failed to send: {0}")]
    Failed(String),
}

/// The transport: delivers a serialized OCPP-J frame to a networking node.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send_frame(&self, node: &NetworkingNodeId, frame: String) -> Result<(), SendError>;
}

/// What arrived for a pending request.
#[derive(Debug)]
enum Answer {
    Result(Value),
    Error {
        code: String,
        description: String,
        details: Value,
    },
}

struct PendingRequest {
    action: &'static str,
    /// Identifies the `send` call that owns this entry.
    token: u64,
    answer: oneshot::Sender<Answer>,
}

type PendingKey = (NetworkingNodeId, String);

pub struct RequestSender {
    sink: Arc<dyn FrameSink>,
    pending: DashMap<PendingKey, PendingRequest>,
    next_token: AtomicU64,
    default_timeout: Duration,
}

impl RequestSender {
    pub fn new(sink: Arc<dyn FrameSink>) -> Self {
        Self::with_timeout(sink, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(sink: Arc<dyn FrameSink>, default_timeout: Duration) -> Self {
        Self {
            sink,
            pending: DashMap::new(),
            next_token: AtomicU64::new(0),
            default_timeout,
        }
    }

    /// A sender using `protocol.request_timeout_secs` as its timeout.
    pub fn from_config(sink: Arc<dyn FrameSink>, protocol: &ProtocolConfig) -> Self {
        Self::with_timeout(sink, protocol.request_timeout())
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Build a request to `destination` using this sender's timeout.
    pub fn request<P: RequestPayload>(&self, destination: SourceRouting, payload: P) -> Request<P> {
        Request::new(
            payload,
            RequestMeta::new(destination).with_timeout(self.default_timeout),
        )
    }

    /// Send `request` as a Call and wait for its answer.
    pub async fn send<P: RequestPayload>(&self, request: Request<P>) -> Response<P::Response> {
        let node = request.meta.destination.next_hop().clone();
        let message_id = request.request_id().to_string();
        let key = (node.clone(), message_id.clone());

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        match self.pending.entry(key.clone()) {
            Entry::Occupied(_) => {
                warn!(
                    node = node.as_str(),
                    action = P::ACTION,
                    message_id = message_id.as_str(),
                    "Message id already pending"
                );
                return Response::<P::Response>::request_error(
                    &request,
                    ResultCode::ProtocolError,
                    Some(format!("duplicate message id {}", message_id)),
                    None,
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingRequest {
                    action: P::ACTION,
                    token,
                    answer: tx,
                });
            }
        }

        info!(
            node = node.as_str(),
            action = P::ACTION,
            message_id = message_id.as_str(),
            "Sending request"
        );

        let frame = request.to_frame().serialize();
        if let Err(e) = self.sink.send_frame(&node, frame).await {
            self.release(&key, token);
            warn!(
                node = node.as_str(),
                action = P::ACTION,
                error = %e,
                "Failed to send request"
            );
            return Self::failure(&request, OcppResult::network_error(e.to_string()));
        }

        match timeout(request.meta.timeout, rx).await {
            Ok(Ok(Answer::Result(payload))) => {
                let meta = ResponseMeta::for_request(&request.meta);
                match Response::<P::Response>::parse(&request, &payload, meta) {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(
                            node = node.as_str(),
                            action = P::ACTION,
                            error = %e,
                            "Invalid response payload"
                        );
                        Response::<P::Response>::formation_violation(&request, e.to_string())
                    }
                }
            }
            Ok(Ok(Answer::Error {
                code,
                description,
                details,
            })) => Self::failure(
                &request,
                OcppResult::from_rpc_error(&code, &description, &details),
            ),
            Ok(Err(_)) => {
                self.release(&key, token);
                let reason = "response channel closed".to_string();
                Response::<P::Response>::failed(&request, Some(reason))
            }
            Err(_) => {
                self.release(&key, token);
                warn!(
                    node = node.as_str(),
                    action = P::ACTION,
                    message_id = message_id.as_str(),
                    "Request timed out"
                );
                Self::failure(&request, OcppResult::timeout(request.meta.timeout))
            }
        }
    }

    /// Send `request` as an unconfirmed Send frame; no answer is expected.
    pub async fn send_unconfirmed<P: RequestPayload>(
        &self,
        request: &Request<P>,
    ) -> Result<(), SendError> {
        let node = request.meta.destination.next_hop();
        let frame = OcppFrame::Send {
            message_id: request.request_id().to_string(),
            action: P::ACTION.to_string(),
            payload: request.to_json(),
        };
        debug!(node = node.as_str(), action = P::ACTION, "Sending unconfirmed message");
        self.sink.send_frame(node, frame.serialize()).await
    }

    /// Complete the pending request `message_id` sent to `node`. Returns
    /// false when nothing was waiting for it.
    pub fn handle_result(&self, node: &NetworkingNodeId, message_id: &str, payload: Value) -> bool {
        match self.take(node, message_id) {
            Some(pending) => {
                info!(
                    node = node.as_str(),
                    action = pending.action,
                    message_id,
                    "Received response"
                );
                let _ = pending.answer.send(Answer::Result(payload));
                true
            }
            None => {
                warn!(node = node.as_str(), message_id, "Response for unknown request");
                false
            }
        }
    }

    pub fn handle_error(
        &self,
        node: &NetworkingNodeId,
        message_id: &str,
        code: &str,
        description: &str,
        details: Value,
    ) -> bool {
        match self.take(node, message_id) {
            Some(pending) => {
                warn!(
                    node = node.as_str(),
                    action = pending.action,
                    message_id,
                    error_code = code,
                    error_description = description,
                    "Received error"
                );
                let _ = pending.answer.send(Answer::Error {
                    code: code.to_string(),
                    description: description.to_string(),
                    details,
                });
                true
            }
            None => {
                warn!(node = node.as_str(), message_id, code, "Error for unknown request");
                false
            }
        }
    }

    /// Drop all requests pending on `node`, e.g. after it disconnected.
    /// Their callers see a failure response.
    pub fn cleanup_node(&self, node: &NetworkingNodeId) {
        self.pending.retain(|key, _| &key.0 != node);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn take(&self, node: &NetworkingNodeId, message_id: &str) -> Option<PendingRequest> {
        self.pending
            .remove(&(node.clone(), message_id.to_string()))
            .map(|(_, pending)| pending)
    }

    /// Remove `key` only if it still belongs to the `send` call holding `token`.
    fn release(&self, key: &PendingKey, token: u64) {
        self.pending.remove_if(key, |_, pending| pending.token == token);
    }

    fn failure<P: RequestPayload>(
        request: &Request<P>,
        result: OcppResult,
    ) -> Response<P::Response> {
        let OcppResult {
            code,
            description,
            details,
        } = result;
        Response::<P::Response>::request_error(request, code, description, details)
    }
}

pub type SharedRequestSender = Arc<RequestSender>;

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{ClearMessageStatus, ResultCode};
    use crate::messages::{ClearDisplayMessageRequest, CostUpdatedRequest};

    struct ChannelSink(mpsc::UnboundedSender<(NetworkingNodeId, String)>);

    #[async_trait]
    impl FrameSink for ChannelSink {
        async fn send_frame(
            &self,
            node: &NetworkingNodeId,
            frame: String,
        ) -> Result<(), SendError> {
            self.0
                .send((node.clone(), frame))
                .map_err(|e| SendError::Failed(e.to_string()))
        }
    }

    struct OfflineSink;

    #[async_trait]
    impl FrameSink for OfflineSink {
        async fn send_frame(
            &self,
            node: &NetworkingNodeId,
            _frame: String,
        ) -> Result<(), SendError> {
            Err(SendError::NotConnected(node.to_string()))
        }
    }

    type Frames = mpsc::UnboundedReceiver<(NetworkingNodeId, String)>;

    fn channel_sender() -> (Arc<RequestSender>, Frames) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(RequestSender::new(Arc::new(ChannelSink(tx)))), rx)
    }

    fn clear_request(sender: &RequestSender) -> Request<ClearDisplayMessageRequest> {
        sender.request(SourceRouting::to("CS-1"), ClearDisplayMessageRequest::new(3))
    }

    fn clear_request_with_id(
        sender: &RequestSender,
        message_id: &str,
    ) -> Request<ClearDisplayMessageRequest> {
        let mut request = clear_request(sender);
        request.meta.request_id = message_id.into();
        request
    }

    #[tokio::test]
    async fn correlates_call_result() {
        let (sender, mut frames) = channel_sender();
        let request = clear_request(&sender);
        let message_id = request.request_id().to_string();

        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(request).await }
        });

        let (node, frame) = frames.recv().await.unwrap();
        assert_eq!(node.as_str(), "CS-1");
        let parsed = OcppFrame::parse(&frame).unwrap();
        assert_eq!(
            parsed,
            OcppFrame::Call {
                message_id: message_id.clone(),
                action: "ClearDisplayMessage".into(),
                payload: json!({ "id": 3 }),
            }
        );

        assert!(sender.handle_result(&node, &message_id, json!({ "status": "Accepted" })));
        let response = task.await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.payload.status, ClearMessageStatus::Accepted);
        assert_eq!(response.meta.request_id.as_str(), message_id);
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn call_error_becomes_failure_response() {
        let (sender, mut frames) = channel_sender();
        let request = clear_request(&sender);
        let message_id = request.request_id().to_string();

        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(request).await }
        });

        let (node, _) = frames.recv().await.unwrap();
        sender.handle_error(&node, &message_id, "NotImplemented", "nope", json!({}));

        let response = task.await.unwrap();
        assert_eq!(response.result.code, ResultCode::NotImplemented);
        assert_eq!(response.payload.status, ClearMessageStatus::Rejected);
    }

    #[tokio::test]
    async fn invalid_payload_is_a_formation_violation() {
        let (sender, mut frames) = channel_sender();
        let request = clear_request(&sender);
        let message_id = request.request_id().to_string();

        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(request).await }
        });

        let (node, _) = frames.recv().await.unwrap();
        sender.handle_result(&node, &message_id, json!({ "status": "Maybe" }));

        let response = task.await.unwrap();
        assert_eq!(response.result.code, ResultCode::FormationViolation);
    }

    #[tokio::test]
    async fn times_out_without_answer() {
        let (sender, _frames) = channel_sender();
        let mut request = clear_request(&sender);
        request.meta.timeout = Duration::from_millis(20);

        let response = sender.send(request).await;
        assert_eq!(response.result.code, ResultCode::Timeout);
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let sender = RequestSender::new(Arc::new(OfflineSink));
        let request = sender.request(
            SourceRouting::to("CS-9"),
            CostUpdatedRequest::new("tx-1", rust_decimal::Decimal::ONE),
        );

        let response = sender.send(request).await;
        assert_eq!(response.result.code, ResultCode::NetworkError);
        assert_eq!(
            response.result.description.as_deref(),
            Some("networking node not connected: CS-9")
        );
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn cleanup_fails_pending_requests() {
        let (sender, mut frames) = channel_sender();
        let request = clear_request(&sender);

        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(request).await }
        });

        let (node, _) = frames.recv().await.unwrap();
        assert_eq!(sender.pending_count(), 1);
        sender.cleanup_node(&node);

        let response = task.await.unwrap();
        assert_eq!(response.result.code, ResultCode::ServerError);
    }

    #[tokio::test]
    async fn unknown_answers_are_ignored() {
        let (sender, _frames) = channel_sender();
        let node = NetworkingNodeId::from("CS-1");
        assert!(!sender.handle_result(&node, "nope", json!({})));
        assert!(!sender.handle_error(&node, "nope", "GenericError", "", json!({})));
    }

    #[tokio::test]
    async fn unconfirmed_messages_use_send_frames() {
        let (sender, mut frames) = channel_sender();
        let request = sender.request(SourceRouting::to("CS-1"), ClearDisplayMessageRequest::new(1));
        sender.send_unconfirmed(&request).await.unwrap();

        let (_, frame) = frames.recv().await.unwrap();
        assert!(matches!(OcppFrame::parse(&frame).unwrap(), OcppFrame::Send { .. }));
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_message_id_keeps_first_request() {
        let (sender, mut frames) = channel_sender();
        let first = clear_request_with_id(&sender, "dup");
        let second = first.clone();

        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(first).await }
        });
        let (node, _) = frames.recv().await.unwrap();

        let rejected = sender.send(second).await;
        assert_eq!(rejected.result.code, ResultCode::ProtocolError);
        assert_eq!(sender.pending_count(), 1);

        assert!(sender.handle_result(&node, "dup", json!({ "status": "Accepted" })));
        let response = task.await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.payload.status, ClearMessageStatus::Accepted);
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn timeout_does_not_remove_a_newer_request() {
        let (sender, mut frames) = channel_sender();
        let mut first = clear_request_with_id(&sender, "reuse");
        first.meta.timeout = Duration::from_millis(20);
        assert_eq!(sender.send(first).await.result.code, ResultCode::Timeout);
        frames.recv().await.unwrap();

        let second = clear_request_with_id(&sender, "reuse");
        let task = tokio::spawn({
            let sender = sender.clone();
            async move { sender.send(second).await }
        });
        let (node, _) = frames.recv().await.unwrap();
        assert_eq!(sender.pending_count(), 1);

        assert!(sender.handle_result(&node, "reuse", json!({ "status": "Unknown" })));
        assert_eq!(task.await.unwrap().payload.status, ClearMessageStatus::Unknown);
    }

    #[test]
    fn timeout_comes_from_protocol_config() {
        let protocol = ProtocolConfig {
            request_timeout_secs: 5,
            ..ProtocolConfig::default()
        };
        let sender = RequestSender::from_config(Arc::new(OfflineSink), &protocol);
        assert_eq!(sender.default_timeout(), Duration::from_secs(5));

        let request = sender.request(SourceRouting::to("CS-1"), ClearDisplayMessageRequest::new(1));
        assert_eq!(request.meta.timeout, Duration::from_secs(5));
    }
}
