//! Test fixtures and mock servers

pub mod mock_node;

pub use mock_node::{MockCluster, MockOracleNode, NodeBehavior};

use types::{CurrentTickInfo, QueryStatistics, TickRange};

/// Behavior of a healthy node at `tick` in epoch 150
pub fn healthy_node(tick: u32) -> NodeBehavior {
    NodeBehavior {
        tick_info: CurrentTickInfo {
            tick_duration: 1_000,
            epoch: 150,
            tick,
            aligned_votes: 451,
            misaligned_votes: 0,
            initial_tick: tick.saturating_sub(500),
        },
        stats: Some(sample_statistics()),
        tick_range: Some(TickRange::new(tick.saturating_sub(500), tick)),
        ..Default::default()
    }
}

/// Statistics with a 96% success rate and nothing else remarkable
pub fn sample_statistics() -> QueryStatistics {
    QueryStatistics {
        pending_count: 2,
        successful_count: 960,
        unresolvable_count: 10,
        timeout_count: 30,
        reveal_tx_count: 970,
        ..Default::default()
    }
}
