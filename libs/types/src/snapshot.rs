//! Per-cycle snapshot handed to snapshot sinks

use crate::consensus::ConsensusView;
use crate::health::{Anomaly, HealthReport};
use crate::scan::NodeScanResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tick that carried at least one oracle query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickQueries {
    pub tick: u32,
    pub count: usize,
    pub query_ids: Vec<i64>,
}

/// Backlog reconstruction over a window of ticks on one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepScanResult {
    pub node: String,
    pub ticks_scanned: u32,
    pub ticks_failed: u32,
    pub queries_found: usize,
    pub ticks_with_queries: Vec<TickQueries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub timestamp: DateTime<Utc>,
    pub consensus: ConsensusView,
    pub nodes: Vec<NodeScanResult>,
    pub anomalies: Vec<Anomaly>,
    pub health_score: u8,
    pub scan_duration_ms: u64,
    pub deep_scan: Option<DeepScanResult>,
}

impl ScanSnapshot {
    pub fn new(
        consensus: ConsensusView,
        nodes: Vec<NodeScanResult>,
        report: HealthReport,
        scan_duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            consensus,
            nodes,
            anomalies: report.anomalies,
            health_score: report.health_score,
            scan_duration_ms,
            deep_scan: None,
        }
    }

    pub fn with_deep_scan(mut self, deep_scan: Option<DeepScanResult>) -> Self {
        self.deep_scan = deep_scan;
        self
    }
}
