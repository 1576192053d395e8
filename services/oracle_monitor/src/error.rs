//! Error types for oracle queries

use codec::CodecError;
use network::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Node answered with a message of the wrong type
    #[error("Unexpected message type {actual} (expected {expected})")]
    UnexpectedMessageType { expected: u8, actual: u8 },

    /// Oracle response carried the wrong kind tag
    #[error("Unexpected oracle response kind {actual} (expected {expected})")]
    UnexpectedResponseKind { expected: u32, actual: u32 },
}

impl QueryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Transport(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
