//! Cross-node consensus view

use crate::oracle::{QueryStatistics, RevenuePoints, TickRange};
use serde::{Deserialize, Serialize};

/// A statistics field on which connected nodes report different values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDisagreement {
    pub metric: String,
    /// One value per node that reported statistics, in node order
    pub values: Vec<u64>,
}

/// Reduction of one scan's node results. Recomputed every cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusView {
    pub nodes_total: usize,
    pub nodes_connected: usize,
    pub nodes_offline: usize,
    pub consensus_tick: u32,
    pub current_epoch: u16,
    pub tick_drift: u32,
    pub stats: Option<QueryStatistics>,
    pub success_rate: f64,
    pub pending_count: usize,
    pub pending_ids: Vec<i64>,
    pub tick_range: Option<TickRange>,
    pub revenue: Option<RevenuePoints>,
    pub stats_disagreements: Vec<StatsDisagreement>,
}
