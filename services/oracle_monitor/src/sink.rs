//! Snapshot sinks
//!
//! Every completed scan cycle produces one [`ScanSnapshot`], which the
//! monitor hands to each registered [`SnapshotSink`] in turn. A failing sink
//! is logged by the caller and never stops the cycle or the other sinks.

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use types::{ScanSnapshot, Severity};

pub const LATEST_FILE: &str = "latest.json";
pub const HISTORY_FILE: &str = "history.jsonl";

#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn publish(&self, snapshot: &ScanSnapshot) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Logs a one-line summary per cycle plus one line per anomaly
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl SnapshotSink for TracingSink {
    async fn publish(&self, snapshot: &ScanSnapshot) -> Result<()> {
        let consensus = &snapshot.consensus;
        info!(
            health_score = snapshot.health_score,
            nodes_connected = consensus.nodes_connected,
            nodes_total = consensus.nodes_total,
            tick = consensus.consensus_tick,
            epoch = consensus.current_epoch,
            tick_drift = consensus.tick_drift,
            success_rate = consensus.success_rate,
            pending = consensus.pending_count,
            scan_duration_ms = snapshot.scan_duration_ms,
            "Oracle health"
        );

        for anomaly in &snapshot.anomalies {
            match anomaly.severity {
                Severity::Critical | Severity::Warning => warn!("{}", anomaly),
                Severity::Info => info!("{}", anomaly),
            }
        }

        if let Some(deep) = &snapshot.deep_scan {
            info!(
                node = %deep.node,
                ticks_scanned = deep.ticks_scanned,
                queries_found = deep.queries_found,
                "Deep scan summary"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Writes `latest.json` and a bounded `history.jsonl` under one directory
#[derive(Debug)]
pub struct JsonFileSink {
    dir: PathBuf,
    history_limit: usize,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>, history_limit: usize) -> Self {
        Self {
            dir: dir.into(),
            history_limit,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    async fn write_latest(&self, snapshot: &ScanSnapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot).context("Failed to serialize snapshot")?;
        let tmp = self.dir.join(format!("{}.tmp", LATEST_FILE));
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        tokio::fs::rename(&tmp, self.latest_path())
            .await
            .context("Failed to replace latest snapshot")?;
        Ok(())
    }

    async fn append_history(&self, snapshot: &ScanSnapshot) -> Result<()> {
        let mut line = serde_json::to_vec(snapshot).context("Failed to serialize snapshot")?;
        line.push(b'\n');

        let path = self.history_path();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {:?}", path))?;
        file.write_all(&line).await?;
        file.flush().await?;
        drop(file);

        self.trim_history().await
    }

    /// Drop the oldest lines once history exceeds the limit
    async fn trim_history(&self) -> Result<()> {
        let path = self.history_path();
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let lines: Vec<&str> = contents.lines().collect();
        if lines.len() <= self.history_limit {
            return Ok(());
        }

        let mut kept = lines[lines.len() - self.history_limit..].join("\n");
        if !kept.is_empty() {
            kept.push('\n');
        }
        tokio::fs::write(&path, kept)
            .await
            .with_context(|| format!("Failed to rewrite {:?}", path))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    async fn publish(&self, snapshot: &ScanSnapshot) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create output dir {:?}", self.dir))?;

        self.write_latest(snapshot).await?;
        self.append_history(snapshot).await
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

/// Keeps snapshots in memory; for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<ScanSnapshot>>,
    fail_next: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<ScanSnapshot> {
        self.snapshots.lock().clone()
    }

    pub fn latest(&self) -> Option<ScanSnapshot> {
        self.snapshots.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.lock().is_empty()
    }

    /// Make the next publish fail
    pub fn fail_next_publish(&self) {
        self.fail_next.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl SnapshotSink for MemorySink {
    async fn publish(&self, snapshot: &ScanSnapshot) -> Result<()> {
        if self.fail_next.swap(false, Ordering::Relaxed) {
            anyhow::bail!("memory sink set to fail");
        }
        self.snapshots.lock().push(snapshot.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
