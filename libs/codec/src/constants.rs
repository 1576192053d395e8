//! # Protocol Constants
//!
//! Fixed sizes, message type numbers and defaults of the node wire protocol.
//! These values are dictated by the nodes and must not change.

/// Size of the framing header preceding every message
pub const HEADER_SIZE: usize = 8;

/// Largest total message size expressible in the 24-bit size field
pub const MAX_MESSAGE_SIZE: usize = 0x00FF_FFFF;

/// Default TCP port nodes listen on
pub const DEFAULT_NODE_PORT: u16 = 21841;

/// Oracle request payload: kind (4) + reserved (4) + argument (8)
pub const ORACLE_REQUEST_SIZE: usize = 16;

/// Leading response-kind tag of every oracle response payload
pub const RESPONSE_KIND_SIZE: usize = 4;

/// Seventeen u64 counters
pub const QUERY_STATISTICS_SIZE: usize = 17 * 8;

pub const TICK_RANGE_SIZE: usize = 8;

pub const CURRENT_TICK_INFO_SIZE: usize = 16;

pub const QUERY_ID_SIZE: usize = 8;

pub const REVENUE_POINT_SIZE: usize = 8;

/// Message type numbers (header byte 3)
pub mod message_type {
    /// Unsolicited peer list gossip, interleaved into any response stream
    pub const EXCHANGE_PUBLIC_PEERS: u8 = 0;
    pub const REQUEST_CURRENT_TICK_INFO: u8 = 27;
    pub const RESPOND_CURRENT_TICK_INFO: u8 = 28;
    /// Terminates a multi-message response
    pub const END_RESPONSE: u8 = 35;
    pub const REQUEST_ORACLE_DATA: u8 = 66;
    pub const RESPOND_ORACLE_DATA: u8 = 67;
}
