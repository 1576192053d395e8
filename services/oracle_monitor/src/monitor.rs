//! Scan cycle scheduler
//!
//! One cycle: scan all nodes, reduce to a consensus view, run the detector,
//! optionally deep scan one node, then publish the snapshot to every sink.

use crate::analyzer::analyze;
use crate::deep_scan::DeepScanner;
use crate::detector::evaluate;
use crate::scanner::{NodeScanner, ScanSettings};
use crate::sink::SnapshotSink;
use monitor_config::MonitorConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use types::{ConsensusView, DeepScanResult, NodeScanResult, ScanSnapshot, TickRange};

pub struct Monitor {
    config: MonitorConfig,
    scanner: NodeScanner,
    deep_scanner: DeepScanner,
    sinks: Vec<Arc<dyn SnapshotSink>>,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let scanner = NodeScanner::new(ScanSettings::from_config(&config));
        let deep_scanner = DeepScanner::from_config(&config);
        Self {
            config,
            scanner,
            deep_scanner,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Run one full cycle and return its snapshot
    pub async fn run_once(&self) -> ScanSnapshot {
        let outcome = self.scanner.scan_all_nodes(&self.config.nodes).await;
        let view = analyze(&outcome.results);
        let report = evaluate(&view, &self.config.detector);
        info!(
            health_score = report.health_score,
            anomalies = report.anomalies.len(),
            tick = view.consensus_tick,
            "Cycle analyzed"
        );

        let deep_scan = if self.config.deep_scan.enabled {
            self.run_deep_scan(&outcome.results, &view).await
        } else {
            None
        };

        let snapshot = ScanSnapshot::new(view, outcome.results, report, outcome.scan_duration_ms)
            .with_deep_scan(deep_scan);
        self.publish(&snapshot).await;
        snapshot
    }

    /// Run cycles every `interval` until `shutdown` resolves
    ///
    /// The first cycle starts immediately. A cycle that outlasts the interval
    /// delays the next one rather than queueing a burst.
    pub async fn run_loop<F>(&self, interval: Duration, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut cycles = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.run_once() => cycles += 1,
            }
        }
        info!(cycles, "Monitor loop stopped");
        cycles
    }

    async fn publish(&self, snapshot: &ScanSnapshot) {
        for sink in &self.sinks {
            match sink.publish(snapshot).await {
                Ok(()) => debug!(sink = sink.name(), "Snapshot published"),
                Err(e) => warn!(sink = sink.name(), error = %e, "Snapshot publish failed"),
            }
        }
    }

    async fn run_deep_scan(
        &self,
        results: &[NodeScanResult],
        view: &ConsensusView,
    ) -> Option<DeepScanResult> {
        let Some((node, range)) = deep_scan_target(
            results,
            view,
            self.config.deep_scan.node.as_deref(),
        ) else {
            warn!("No connected node with a tick range, skipping deep scan");
            return None;
        };

        match self.deep_scanner.scan(&node, range).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(node = %node, error = %e, "Deep scan failed");
                None
            }
        }
    }
}

/// Pick the node and tick range for a deep scan
///
/// A configured node is used with its own range, falling back to the
/// consensus range. Otherwise the first connected node with a range wins.
fn deep_scan_target(
    results: &[NodeScanResult],
    view: &ConsensusView,
    preferred: Option<&str>,
) -> Option<(String, TickRange)> {
    if let Some(ip) = preferred {
        let own_range = results
            .iter()
            .find(|r| r.ip == ip && r.is_connected())
            .and_then(|r| r.tick_range);
        return own_range
            .or(view.tick_range)
            .map(|range| (ip.to_string(), range));
    }

    results
        .iter()
        .filter(|r| r.is_connected())
        .find_map(|r| r.tick_range.map(|range| (r.ip.clone(), range)))
}
