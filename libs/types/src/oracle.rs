//! Oracle payload structures
//!
//! Typed views of the payloads a node returns for oracle queries. The codec
//! crate owns the byte layouts; these types only carry the decoded values.

use serde::{Deserialize, Serialize};

/// Number of computor slots a revenue-points response can carry
pub const NUM_COMPUTORS: usize = 676;

/// Number of computors reported in [`RevenuePoints::top_computors`]
pub const TOP_COMPUTORS: usize = 10;

/// Statistics field names in wire (declaration) order
pub const QUERY_STATISTICS_FIELDS: [&str; QueryStatistics::FIELD_COUNT] = [
    "pendingCount",
    "pendingOracleMachineCount",
    "pendingCommitCount",
    "pendingRevealCount",
    "successfulCount",
    "revealTxCount",
    "unresolvableCount",
    "timeoutCount",
    "timeoutNoReplyCount",
    "timeoutNoCommitCount",
    "timeoutNoRevealCount",
    "oracleMachineRepliesDisagreeCount",
    "oracleMachineReplyAvgMilliTicksPerQuery",
    "commitAvgMilliTicksPerQuery",
    "successAvgMilliTicksPerQuery",
    "timeoutAvgMilliTicksPerQuery",
    "wrongKnowledgeProofCount",
];

/// Snapshot of a node's oracle query counters
///
/// Field order matches the wire layout and [`QUERY_STATISTICS_FIELDS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStatistics {
    pub pending_count: u64,
    pub pending_oracle_machine_count: u64,
    pub pending_commit_count: u64,
    pub pending_reveal_count: u64,
    pub successful_count: u64,
    pub reveal_tx_count: u64,
    pub unresolvable_count: u64,
    pub timeout_count: u64,
    pub timeout_no_reply_count: u64,
    pub timeout_no_commit_count: u64,
    pub timeout_no_reveal_count: u64,
    pub oracle_machine_replies_disagree_count: u64,
    pub oracle_machine_reply_avg_milli_ticks_per_query: u64,
    pub commit_avg_milli_ticks_per_query: u64,
    pub success_avg_milli_ticks_per_query: u64,
    pub timeout_avg_milli_ticks_per_query: u64,
    pub wrong_knowledge_proof_count: u64,
}

impl QueryStatistics {
    pub const FIELD_COUNT: usize = 17;

    /// Build from values in wire order
    pub fn from_values(v: [u64; Self::FIELD_COUNT]) -> Self {
        Self {
            pending_count: v[0],
            pending_oracle_machine_count: v[1],
            pending_commit_count: v[2],
            pending_reveal_count: v[3],
            successful_count: v[4],
            reveal_tx_count: v[5],
            unresolvable_count: v[6],
            timeout_count: v[7],
            timeout_no_reply_count: v[8],
            timeout_no_commit_count: v[9],
            timeout_no_reveal_count: v[10],
            oracle_machine_replies_disagree_count: v[11],
            oracle_machine_reply_avg_milli_ticks_per_query: v[12],
            commit_avg_milli_ticks_per_query: v[13],
            success_avg_milli_ticks_per_query: v[14],
            timeout_avg_milli_ticks_per_query: v[15],
            wrong_knowledge_proof_count: v[16],
        }
    }

    /// Values in wire order, parallel to [`QUERY_STATISTICS_FIELDS`]
    pub fn values(&self) -> [u64; Self::FIELD_COUNT] {
        [
            self.pending_count,
            self.pending_oracle_machine_count,
            self.pending_commit_count,
            self.pending_reveal_count,
            self.successful_count,
            self.reveal_tx_count,
            self.unresolvable_count,
            self.timeout_count,
            self.timeout_no_reply_count,
            self.timeout_no_commit_count,
            self.timeout_no_reveal_count,
            self.oracle_machine_replies_disagree_count,
            self.oracle_machine_reply_avg_milli_ticks_per_query,
            self.commit_avg_milli_ticks_per_query,
            self.success_avg_milli_ticks_per_query,
            self.timeout_avg_milli_ticks_per_query,
            self.wrong_knowledge_proof_count,
        ]
    }

    /// Iterate `(field name, value)` pairs in wire order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, u64)> {
        QUERY_STATISTICS_FIELDS.into_iter().zip(self.values())
    }

    /// Percentage of resolved queries that succeeded, rounded to 2 decimals
    ///
    /// Returns 0.0 when no query has resolved yet.
    pub fn success_rate(&self) -> f64 {
        let resolved = self
            .successful_count
            .saturating_add(self.timeout_count)
            .saturating_add(self.unresolvable_count);
        if resolved == 0 {
            return 0.0;
        }
        let rate = self.successful_count as f64 / resolved as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

/// One computor's revenue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputorRevenue {
    pub index: usize,
    pub points: u64,
}

/// Per-computor revenue points with derived aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoints {
    points: Vec<u64>,
    total_revenue: u64,
    active_computors: usize,
    top_computors: Vec<ComputorRevenue>,
}

impl RevenuePoints {
    /// Build from raw per-slot points; entries beyond [`NUM_COMPUTORS`] are dropped
    pub fn new(mut points: Vec<u64>) -> Self {
        points.truncate(NUM_COMPUTORS);

        let total_revenue = points.iter().fold(0u64, |acc, p| acc.saturating_add(*p));
        let active_computors = points.iter().filter(|p| **p > 0).count();

        let mut ranked: Vec<ComputorRevenue> = points
            .iter()
            .enumerate()
            .map(|(index, points)| ComputorRevenue {
                index,
                points: *points,
            })
            .collect();
        // Stable sort keeps ascending index order among equal values
        ranked.sort_by(|a, b| b.points.cmp(&a.points));
        ranked.truncate(TOP_COMPUTORS);

        Self {
            points,
            total_revenue,
            active_computors,
            top_computors: ranked,
        }
    }

    pub fn points(&self) -> &[u64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_revenue(&self) -> u64 {
        self.total_revenue
    }

    pub fn active_computors(&self) -> usize {
        self.active_computors
    }

    pub fn top_computors(&self) -> &[ComputorRevenue] {
        &self.top_computors
    }
}

/// Range of ticks a node holds oracle data for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRange {
    pub first_tick: u32,
    pub current_tick: u32,
}

impl TickRange {
    pub fn new(first_tick: u32, current_tick: u32) -> Self {
        Self {
            first_tick,
            current_tick,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.first_tick <= self.current_tick
    }
}

/// Node answer to a current-tick request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTickInfo {
    pub tick_duration: u16,
    pub epoch: u16,
    pub tick: u32,
    pub aligned_votes: u16,
    pub misaligned_votes: u16,
    pub initial_tick: u32,
}

/// Opaque blobs returned for a single query id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    pub query_id: i64,
    pub metadata: Option<Vec<u8>>,
    pub query_data: Option<Vec<u8>>,
    pub reply_data: Option<Vec<u8>>,
}

impl QueryRecord {
    /// True once the node has stored a reply for the query
    pub fn is_answered(&self) -> bool {
        self.reply_data.is_some()
    }
}
