//! Oracle monitor entry point

use anyhow::{Context, Result};
use clap::Parser;
use monitor_config::MonitorConfig;
use oracle_monitor::{JsonFileSink, Monitor, TracingSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node IP to scan; repeat for several nodes. Replaces the configured list.
    #[arg(short, long = "node")]
    nodes: Vec<String>,

    /// Node port
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep scanning on an interval instead of running once
    #[arg(long = "loop")]
    run_loop: bool,

    /// Seconds between cycles in loop mode
    #[arg(long)]
    interval: Option<u64>,

    /// Walk the backlog of one node tick by tick
    #[arg(long)]
    deep_scan: bool,

    /// Maximum ticks walked by the deep scan
    #[arg(long)]
    deep_limit: Option<u32>,

    /// Directory for latest.json and history.jsonl
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut MonitorConfig) {
        if !self.nodes.is_empty() {
            config.nodes = self.nodes.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(interval) = self.interval {
            config.scan_interval_secs = interval;
        }
        if self.deep_scan {
            config.deep_scan.enabled = true;
        }
        if let Some(limit) = self.deep_limit {
            config.deep_scan.limit = limit;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = Some(dir.clone());
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "oracle_monitor=info,warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    info!("Starting oracle monitor v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        MonitorConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(
        nodes = config.nodes.len(),
        port = config.port,
        deep_scan = config.deep_scan.enabled,
        "Configuration loaded"
    );

    let mut monitor = Monitor::new(config.clone()).with_sink(Arc::new(TracingSink));
    if let Some(dir) = &config.output.dir {
        info!("Writing snapshots to {:?}", dir);
        monitor = monitor.with_sink(Arc::new(JsonFileSink::new(
            dir.clone(),
            config.output.history_limit,
        )));
    }

    if args.run_loop {
        let interval = Duration::from_secs(config.scan_interval_secs.max(1));
        monitor.run_loop(interval, shutdown_signal()).await;
    } else {
        let snapshot = monitor.run_once().await;
        info!(health_score = snapshot.health_score, "Scan finished");
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
