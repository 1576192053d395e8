//! Monitor Configuration Module
//!
//! Loads [`MonitorConfig`] from an optional TOML file with environment
//! variable overrides (`ORACLE_MONITOR__` prefix, `__` between nested keys,
//! comma-separated `nodes`). Every field has a default, so an empty file or
//! no file at all yields a usable config once nodes are supplied.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Config file picked up when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/oracle_monitor.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "ORACLE_MONITOR";

/// Main monitor configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Node IPs (or host names) to scan each cycle
    pub nodes: Vec<String>,

    /// TCP port every node listens on
    pub port: u16,

    pub connect_timeout_ms: u64,

    /// Bound on each header/payload wait during a scan
    pub read_timeout_ms: u64,

    /// Delay between cycles when running in loop mode
    pub scan_interval_secs: u64,

    pub deep_scan: DeepScanSettings,

    pub detector: DetectorThresholds,

    pub output: OutputSettings,
}

/// Sequential per-tick backlog scan against one node
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DeepScanSettings {
    pub enabled: bool,

    /// Maximum number of ticks walked back from the current tick
    pub limit: u32,

    pub read_timeout_ms: u64,

    /// Node to scan; defaults to the first connected node with a tick range
    pub node: Option<String>,
}

/// Anomaly detector thresholds
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DetectorThresholds {
    /// Fewer connected nodes than this is critical
    pub min_connected_nodes: usize,

    /// Success rate (percent) below this is critical
    pub critical_success_rate: f64,

    /// Success rate (percent) below this is informational
    pub healthy_success_rate: f64,

    /// Tick spread at or above this is a warning
    pub max_tick_drift: u32,

    /// Pending query count above this is a warning
    pub max_pending: usize,

    /// Connected nodes needed for the score bonus
    pub bonus_min_nodes: usize,
}

/// Snapshot output settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for `latest.json` and `history.jsonl`; no file output if unset
    pub dir: Option<PathBuf>,

    /// Lines kept in `history.jsonl`
    pub history_limit: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            port: 21841,
            connect_timeout_ms: 8_000,
            read_timeout_ms: 8_000,
            scan_interval_secs: 60,
            deep_scan: DeepScanSettings::default(),
            detector: DetectorThresholds::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Default for DeepScanSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: 500,
            read_timeout_ms: 15_000,
            node: None,
        }
    }
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            min_connected_nodes: 2,
            critical_success_rate: 50.0,
            healthy_success_rate: 90.0,
            max_tick_drift: 5,
            max_pending: 10,
            bonus_min_nodes: 4,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: None,
            history_limit: 1_000,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a file with environment overrides
    ///
    /// An explicit `path` must exist; otherwise [`DEFAULT_CONFIG_PATH`] is
    /// used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => {
                info!("Loading monitor config: {:?}", path);
                File::from(path).required(true)
            }
            None => {
                debug!("Looking for default monitor config at {}", DEFAULT_CONFIG_PATH);
                File::with_name(DEFAULT_CONFIG_PATH).required(false)
            }
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("nodes")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut config: MonitorConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.expand_env_vars()?;
        Ok(config)
    }

    /// Reject configurations the scanner cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            bail!("No nodes configured");
        }
        if let Some(blank) = self.nodes.iter().find(|n| n.trim().is_empty()) {
            bail!("Blank node entry: {:?}", blank);
        }
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            bail!("Timeouts must be greater than zero");
        }
        if self.deep_scan.enabled {
            if self.deep_scan.limit == 0 {
                bail!("Deep scan limit must be greater than zero");
            }
            if self.deep_scan.read_timeout_ms == 0 {
                bail!("Deep scan timeout must be greater than zero");
            }
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn deep_scan_timeout(&self) -> Duration {
        Duration::from_millis(self.deep_scan.read_timeout_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Expand environment variables in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(dir) = &self.output.dir {
            let raw = dir.to_string_lossy();
            let expanded = shellexpand::full(&raw).context("Failed to expand output dir")?;
            self.output.dir = Some(PathBuf::from(expanded.as_ref()));
        }
        Ok(())
    }
}

/// Convenience function to load and validate configuration
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let config = MonitorConfig::load(path)?;
    config.validate()?;
    Ok(config)
}
