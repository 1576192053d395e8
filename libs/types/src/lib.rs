//! # Oracle Monitor Types
//!
//! Pure data structures shared by the codec, the node transport and the
//! monitor service. Nothing in here performs I/O.
//!
//! ## Layering
//!
//! ```text
//! libs/types → libs/codec → libs/network → services/oracle_monitor
//!     ↑              ↓                         ↓
//! Pure Data    Wire Encoding            Scan / Analyze / Detect
//! ```
//!
//! - [`oracle`]: payload structures decoded from node responses
//! - [`scan`]: per-node scan outcomes
//! - [`consensus`]: the cross-node reduction of a scan
//! - [`health`]: anomalies and health scoring output
//! - [`snapshot`]: the per-cycle record handed to snapshot sinks

pub mod consensus;
pub mod health;
pub mod oracle;
pub mod scan;
pub mod snapshot;

pub use consensus::{ConsensusView, StatsDisagreement};
pub use health::{Anomaly, AnomalyKind, HealthReport, Severity};
pub use oracle::{
    ComputorRevenue, CurrentTickInfo, QueryRecord, QueryStatistics, RevenuePoints, TickRange,
    NUM_COMPUTORS, QUERY_STATISTICS_FIELDS, TOP_COMPUTORS,
};
pub use scan::{NodeScanResult, NodeStatus, ScanOutcome};
pub use snapshot::{DeepScanResult, ScanSnapshot, TickQueries};
