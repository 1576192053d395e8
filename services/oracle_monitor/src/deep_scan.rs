//! Deep historical scan
//!
//! Walks one node's stored ticks from newest to oldest, asking for the query
//! ids of each tick. Used to rebuild a backlog that the pending list alone
//! does not show. Runs on its own connection with a longer read timeout,
//! since per-tick lookups on a loaded node are slow.

use crate::client::OracleQueryClient;
use crate::error::Result;
use monitor_config::MonitorConfig;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use types::{DeepScanResult, TickQueries, TickRange};

pub const DEFAULT_DEEP_SCAN_LIMIT: u32 = 500;
pub const DEFAULT_DEEP_SCAN_TIMEOUT_SECS: u64 = 15;

/// Ticks a deep scan visits: at most `limit` back from the current tick,
/// never before the first stored tick
///
/// `None` for a range whose first tick is after its current tick.
pub fn tick_window(range: &TickRange, limit: u32) -> Option<RangeInclusive<u32>> {
    if !range.is_valid() {
        return None;
    }
    let oldest = range.first_tick.max(range.current_tick.saturating_sub(limit));
    Some(oldest..=range.current_tick)
}

/// Walk `range` newest tick first on an already connected client
///
/// A tick whose lookup fails goes into `ticks_failed` rather than
/// `ticks_scanned`; the walk goes on.
pub async fn deep_scan(
    client: &mut OracleQueryClient,
    range: TickRange,
    limit: u32,
) -> DeepScanResult {
    let mut result = DeepScanResult {
        node: client.ip().to_string(),
        ..Default::default()
    };

    let Some(window) = tick_window(&range, limit) else {
        warn!(
            node = %client.ip(),
            first_tick = range.first_tick,
            current_tick = range.current_tick,
            "Invalid tick range, nothing to scan"
        );
        return result;
    };

    let started = Instant::now();
    for tick in window.rev() {
        match client.get_query_ids_at_tick(tick).await {
            Ok(query_ids) if query_ids.is_empty() => result.ticks_scanned += 1,
            Ok(query_ids) => {
                result.ticks_scanned += 1;
                result.queries_found += query_ids.len();
                result.ticks_with_queries.push(TickQueries {
                    tick,
                    count: query_ids.len(),
                    query_ids,
                });
            }
            Err(e) => {
                debug!(node = %client.ip(), tick, error = %e, "Tick lookup failed");
                result.ticks_failed += 1;
            }
        }
    }

    info!(
        node = %result.node,
        ticks_scanned = result.ticks_scanned,
        ticks_failed = result.ticks_failed,
        queries_found = result.queries_found,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Deep scan complete"
    );
    result
}

/// Connection and walk parameters for a deep scan
#[derive(Debug, Clone)]
pub struct DeepScanner {
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub limit: u32,
}

impl Default for DeepScanner {
    fn default() -> Self {
        Self {
            port: codec::DEFAULT_NODE_PORT,
            connect_timeout: Duration::from_secs(network::DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_DEEP_SCAN_TIMEOUT_SECS),
            limit: DEFAULT_DEEP_SCAN_LIMIT,
        }
    }
}

impl DeepScanner {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            port: config.port,
            connect_timeout: config.connect_timeout(),
            read_timeout: config.deep_scan_timeout(),
            limit: config.deep_scan.limit,
        }
    }

    /// Open a dedicated connection to `ip` and walk `range` on it
    pub async fn scan(&self, ip: &str, range: TickRange) -> Result<DeepScanResult> {
        let (mut client, _) =
            OracleQueryClient::connect(ip, self.port, self.connect_timeout, self.read_timeout)
                .await?;
        let result = deep_scan(&mut client, range, self.limit).await;
        client.close().await;
        Ok(result)
    }
}
