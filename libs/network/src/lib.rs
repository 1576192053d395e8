//! Network Infrastructure
//!
//! TCP transport to oracle nodes: connection lifecycle, buffered
//! reassembly of framed messages, and the read strategies the node protocol
//! needs (single message, peer-exchange skipping, terminated multi-message
//! responses).

pub mod error;
pub mod transports;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use transports::{ConnectionState, Message, NodeTransport, TransportStats, MAX_PEER_EXCHANGE_SKIPS};

// Constants for configuration
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 8;
