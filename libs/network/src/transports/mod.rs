//! Node transport layer
//!
//! A single framed TCP transport per node. Framing rules come from the codec
//! crate; this layer owns sockets, buffering and timeouts.

use bytes::Bytes;

pub mod tcp;


pub use tcp::{ConnectionState, NodeTransport, TransportStats, MAX_PEER_EXCHANGE_SKIPS};

/// One framed message, detached from the receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_type: u8,
    pub payload: Bytes,
}

impl Message {
    pub fn is(&self, message_type: u8) -> bool {
        self.message_type == message_type
    }
}
