//! Transport Error Types
//!
//! Failures of a single node connection: connecting, framed reads and
//! writes, and stream-level protocol noise.

use codec::CodecError;
use thiserror::Error;

/// Main transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connect did not complete within the timeout
    #[error("Connect to {addr} timed out after {timeout_ms}ms")]
    ConnectTimeout { addr: String, timeout_ms: u64 },

    /// Connect was refused, reset, or the address did not resolve
    #[error("Connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Not enough bytes arrived for a header or payload in time
    #[error("Read timed out after {timeout_ms}ms waiting for {wanted} buffered bytes (have {buffered})")]
    ReadTimeout {
        timeout_ms: u64,
        wanted: usize,
        buffered: usize,
    },

    #[error("Write of {bytes} bytes timed out after {timeout_ms}ms")]
    WriteTimeout { bytes: usize, timeout_ms: u64 },

    /// Node kept sending peer lists instead of the awaited reply
    #[error("Skipped {limit} peer exchange messages without receiving a reply")]
    TooManyPeerExchanges { limit: usize },

    /// Peer closed the socket while a read was pending
    #[error("Connection closed by peer with {buffered} bytes buffered")]
    ConnectionClosed { buffered: usize },

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Invalid transport state: {operation} not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Generic I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Framing errors from the codec
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Whether the error came from a timeout rather than a broken stream
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout { .. } | Self::ReadTimeout { .. } | Self::WriteTimeout { .. }
        )
    }

    /// Whether the connection is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed { .. }
                | Self::NotConnected
                | Self::Io { .. }
                | Self::Codec(CodecError::MalformedHeader { .. })
        )
    }
}
