//! # Oracle Monitor Configuration
//!
//! Explicit configuration value for the monitor: which nodes to scan, how
//! long each network wait may take, deep-scan behaviour, detector
//! thresholds and snapshot output. Nothing here is process-global; the
//! loaded [`MonitorConfig`] is passed to the scanner and scheduler.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use monitor_config::MonitorConfig;
//!
//! let config = MonitorConfig::load(None)?;
//! config.validate()?;
//! println!("scanning {} nodes", config.nodes.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod settings;

pub use settings::{
    load_config, DeepScanSettings, DetectorThresholds, MonitorConfig, OutputSettings,
    DEFAULT_CONFIG_PATH, ENV_PREFIX,
};
