//! Cross-node analyzer
//!
//! Pure reduction of one scan's node results into a [`ConsensusView`].
//! Only connected nodes contribute. Fields taken "from the first node" use
//! input order; nodes are not ranked.

use std::collections::BTreeSet;
use types::{
    ConsensusView, NodeScanResult, QueryStatistics, StatsDisagreement, QUERY_STATISTICS_FIELDS,
};

pub fn analyze(results: &[NodeScanResult]) -> ConsensusView {
    let connected: Vec<&NodeScanResult> = results.iter().filter(|r| r.is_connected()).collect();
    let ticks: Vec<u32> = connected.iter().map(|r| r.tick).filter(|t| *t > 0).collect();

    let consensus_tick = most_common(&ticks).unwrap_or(0);
    let current_epoch = connected
        .iter()
        .find(|r| consensus_tick > 0 && r.tick == consensus_tick)
        .map(|r| r.epoch)
        .unwrap_or(0);

    let stats = connected.iter().find_map(|r| r.stats);
    let tick_range = connected.iter().find_map(|r| r.tick_range);
    let revenue = connected.iter().find_map(|r| r.revenue_points.clone());

    let node_stats: Vec<QueryStatistics> = connected.iter().filter_map(|r| r.stats).collect();

    let pending_ids: Vec<i64> = connected
        .iter()
        .flat_map(|r| r.pending_ids.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ConsensusView {
        nodes_total: results.len(),
        nodes_connected: connected.len(),
        nodes_offline: results.len() - connected.len(),
        consensus_tick,
        current_epoch,
        tick_drift: tick_drift(&ticks),
        success_rate: stats.map(|s| s.success_rate()).unwrap_or(0.0),
        stats,
        pending_count: pending_ids.len(),
        pending_ids,
        tick_range,
        revenue,
        stats_disagreements: stats_disagreements(&node_stats),
    }
}

/// Spread between the highest and lowest reported tick
pub fn tick_drift(ticks: &[u32]) -> u32 {
    if ticks.len() < 2 {
        return 0;
    }
    let max = ticks.iter().max().copied().unwrap_or(0);
    let min = ticks.iter().min().copied().unwrap_or(0);
    max - min
}

/// Statistics fields on which nodes report more than one distinct value
pub fn stats_disagreements(stats: &[QueryStatistics]) -> Vec<StatsDisagreement> {
    let per_node: Vec<[u64; QueryStatistics::FIELD_COUNT]> =
        stats.iter().map(QueryStatistics::values).collect();

    QUERY_STATISTICS_FIELDS
        .iter()
        .enumerate()
        .filter_map(|(field, metric)| {
            let values: Vec<u64> = per_node.iter().map(|v| v[field]).collect();
            let distinct: BTreeSet<u64> = values.iter().copied().collect();
            (distinct.len() > 1).then(|| StatsDisagreement {
                metric: metric.to_string(),
                values,
            })
        })
        .collect()
}

/// Most frequent value; ties go to the value seen first
fn most_common(values: &[u32]) -> Option<u32> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((*value, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
