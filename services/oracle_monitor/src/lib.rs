//! # Oracle Monitor
//!
//! Health monitor for a fleet of oracle nodes. Each cycle queries every
//! configured node over its TCP protocol, reconciles what the nodes report
//! and flags anomalies with a 0-100 health score.
//!
//! ## Pipeline
//!
//! ```text
//! NodeScanner ──► analyzer::analyze ──► detector::evaluate ──► SnapshotSink(s)
//!      │                                                            ▲
//!      └── OracleQueryClient (one per node)     deep_scan (optional)┘
//! ```
//!
//! - [`client`]: per-node request/response operations
//! - [`scanner`]: concurrent scan of all nodes, failure isolated per node
//! - [`analyzer`]: pure reduction into a [`types::ConsensusView`]
//! - [`detector`]: rule table and health score
//! - [`deep_scan`]: per-tick backlog walk on one node
//! - [`sink`] and [`monitor`]: publishing and scheduling

pub mod analyzer;
pub mod client;
pub mod deep_scan;
pub mod detector;
pub mod error;
pub mod monitor;
pub mod scanner;
pub mod sink;

pub use analyzer::{analyze, stats_disagreements, tick_drift};
pub use client::OracleQueryClient;
pub use deep_scan::{deep_scan, tick_window, DeepScanner};
pub use detector::{detect, evaluate, health_score};
pub use error::{QueryError, Result};
pub use monitor::Monitor;
pub use scanner::{scan_node, NodeScanner, ScanSettings};
pub use sink::{JsonFileSink, MemorySink, SnapshotSink, TracingSink};
