//! Multi-node scanner
//!
//! Runs the same query sequence against every configured node, one spawned
//! task per node, and waits for all of them. A slow or dead node costs at
//! most its own timeouts; it never delays or fails another node's scan.

use crate::client::OracleQueryClient;
use futures::future::join_all;
use monitor_config::MonitorConfig;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use types::{NodeScanResult, NodeStatus, ScanOutcome};

/// Connection parameters shared by every node task
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            port: codec::DEFAULT_NODE_PORT,
            connect_timeout: Duration::from_secs(network::DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(network::DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

impl ScanSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            port: config.port,
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeScanner {
    settings: ScanSettings,
}

impl NodeScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan every node concurrently; results come back in `ips` order
    pub async fn scan_all_nodes(&self, ips: &[String]) -> ScanOutcome {
        let started = Instant::now();

        let tasks = ips.iter().map(|ip| {
            let ip = ip.clone();
            let settings = self.settings.clone();
            tokio::spawn(async move { scan_node(ip, settings).await })
        });
        let settled = join_all(tasks).await;

        let results: Vec<NodeScanResult> = settled
            .into_iter()
            .zip(ips)
            .map(|(outcome, ip)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    warn!(node = %ip, error = %e, "Node scan task failed");
                    NodeScanResult::failed(ip.as_str(), format!("scan task failed: {}", e))
                }
            })
            .collect();

        let scan_duration_ms = started.elapsed().as_millis() as u64;
        let connected = results.iter().filter(|r| r.is_connected()).count();
        info!(
            nodes = results.len(),
            connected,
            scan_duration_ms,
            "Scan complete"
        );

        ScanOutcome {
            results,
            scan_duration_ms,
        }
    }
}

/// Scan one node
///
/// Only connect and the current-tick query are mandatory; the remaining
/// queries fill in what they can and leave the rest empty.
pub async fn scan_node(ip: String, settings: ScanSettings) -> NodeScanResult {
    let mut result = NodeScanResult::new(ip.as_str());

    let (mut client, latency_ms) = match OracleQueryClient::connect(
        &ip,
        settings.port,
        settings.connect_timeout,
        settings.read_timeout,
    )
    .await
    {
        Ok(connected) => connected,
        Err(e) => {
            warn!(node = %ip, error = %e, "Node unreachable");
            result.error = Some(e.to_string());
            return result;
        }
    };
    result.latency_ms = latency_ms;

    match client.get_current_tick().await {
        Ok(info) => {
            result.status = NodeStatus::Connected;
            result.tick = info.tick;
            result.epoch = info.epoch;
            result.tick_duration = info.tick_duration;
        }
        Err(e) => {
            warn!(node = %ip, error = %e, "Current tick query failed");
            result.error = Some(e.to_string());
            client.close().await;
            return result;
        }
    }

    match client.get_oracle_statistics().await {
        Ok(stats) => result.stats = Some(stats),
        Err(e) => {
            warn!(node = %ip, error = %e, "Statistics query failed");
            result.error = Some(format!("statistics: {}", e));
        }
    }

    match client.get_pending_query_ids().await {
        Ok(ids) => result.pending_ids = ids,
        Err(e) => debug!(node = %ip, error = %e, "Pending query ids unavailable"),
    }

    match client.get_tick_range().await {
        Ok(range) => result.tick_range = range,
        Err(e) => debug!(node = %ip, error = %e, "Tick range unavailable"),
    }

    result.revenue_points = client.get_revenue_points().await;

    client.close().await;
    debug!(
        node = %ip,
        tick = result.tick,
        latency_ms,
        pending = result.pending_ids.len(),
        "Node scanned"
    );
    result
}
