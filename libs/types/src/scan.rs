//! Per-node scan outcomes

use crate::oracle::{QueryStatistics, RevenuePoints, TickRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reachability of a node after one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Connect or the mandatory current-tick query failed
    Offline,
    /// Node answered the current-tick query
    Connected,
    /// The node's scan task itself failed
    Error,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Offline => write!(f, "offline"),
            NodeStatus::Connected => write!(f, "connected"),
            NodeStatus::Error => write!(f, "error"),
        }
    }
}

/// Everything learned from one node in one scan cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeScanResult {
    pub ip: String,
    pub status: NodeStatus,
    pub latency_ms: u64,
    pub tick: u32,
    pub epoch: u16,
    pub tick_duration: u16,
    pub stats: Option<QueryStatistics>,
    pub pending_ids: Vec<i64>,
    pub tick_range: Option<TickRange>,
    pub revenue_points: Option<RevenuePoints>,
    pub error: Option<String>,
}

impl NodeScanResult {
    /// Fresh result for `ip`; offline until the node proves otherwise
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            status: NodeStatus::Offline,
            latency_ms: 0,
            tick: 0,
            epoch: 0,
            tick_duration: 0,
            stats: None,
            pending_ids: Vec::new(),
            tick_range: None,
            revenue_points: None,
            error: None,
        }
    }

    /// Result for a node whose scan task could not complete
    pub fn failed(ip: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: NodeStatus::Error,
            error: Some(error.into()),
            ..Self::new(ip)
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == NodeStatus::Connected
    }
}

/// All node results of one scan plus its wall-clock duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub results: Vec<NodeScanResult>,
    pub scan_duration_ms: u64,
}
