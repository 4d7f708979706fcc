//! In-memory store for NotifyDisplayMessages aggregation.
//!
//! After a CSMS sends `GetDisplayMessages`, the station may answer with
//! several `NotifyDisplayMessages` requests (`tbc = true` until the last
//! one). This store collects all parts keyed by `(node, request_id)` and
//! exposes the assembled report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::domain::{MessageInfo, NetworkingNodeId};
use crate::messages::NotifyDisplayMessagesRequest;

/// All display messages reported for one GetDisplayMessages request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMessageReport {
    pub node: NetworkingNodeId,
    pub request_id: i32,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub in_progress: bool,
    pub parts_received: u32,
    pub messages: Vec<MessageInfo>,
}

impl DisplayMessageReport {
    fn started(node: &NetworkingNodeId, request_id: i32) -> Self {
        Self {
            node: node.clone(),
            request_id,
            started_at: Utc::now(),
            completed_at: None,
            in_progress: true,
            parts_received: 0,
            messages: Vec::new(),
        }
    }

    fn add_part(&mut self, part: &NotifyDisplayMessagesRequest) {
        self.parts_received += 1;
        self.messages.extend(part.messages().iter().cloned());
        if !part.tbc {
            self.in_progress = false;
            self.completed_at = Some(Utc::now());
        }
    }
}

type ReportKey = (NetworkingNodeId, i32);

#[derive(Debug, Default)]
pub struct DisplayMessageReportStore {
    reports: DashMap<ReportKey, DisplayMessageReport>,
    /// Most recent request id per node.
    latest: DashMap<NetworkingNodeId, i32>,
}

impl DisplayMessageReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty report when GetDisplayMessages is sent. Completed
    /// reports of `node` are dropped; unfinished ones are kept.
    pub fn init_report(&self, node: &NetworkingNodeId, request_id: i32) {
        self.reports.retain(|key, report| &key.0 != node || report.in_progress);
        self.reports.insert(
            (node.clone(), request_id),
            DisplayMessageReport::started(node, request_id),
        );
        self.latest.insert(node.clone(), request_id);
    }

    /// Add one NotifyDisplayMessages part. Parts for a request that was
    /// never initialised start a new report.
    pub fn append(&self, node: &NetworkingNodeId, part: &NotifyDisplayMessagesRequest) {
        let request_id = part.request_id;
        let mut report = self
            .reports
            .entry((node.clone(), request_id))
            .or_insert_with(|| DisplayMessageReport::started(node, request_id));
        report.add_part(part);
        debug!(
            node = node.as_str(),
            request_id,
            parts = report.parts_received,
            complete = !report.in_progress,
            "Display message report part received"
        );
        drop(report);

        self.latest.entry(node.clone()).or_insert(request_id);
    }

    pub fn get_report(
        &self,
        node: &NetworkingNodeId,
        request_id: i32,
    ) -> Option<DisplayMessageReport> {
        self.reports
            .get(&(node.clone(), request_id))
            .map(|r| r.clone())
    }

    pub fn get_latest_report(&self, node: &NetworkingNodeId) -> Option<DisplayMessageReport> {
        let request_id = *self.latest.get(node)?;
        self.get_report(node, request_id)
    }

    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    /// Forget every report of `node`.
    pub fn remove_node(&self, node: &NetworkingNodeId) {
        self.reports.retain(|key, _| &key.0 != node);
        self.latest.remove(node);
    }
}

pub type SharedDisplayMessageReportStore = Arc<DisplayMessageReportStore>;
