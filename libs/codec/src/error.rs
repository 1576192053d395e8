//! Codec errors for message framing and payload decoding

use thiserror::Error;

/// Framing and payload decoding failures
///
/// None of these are recoverable on the same byte stream: a malformed header
/// means the reader has lost frame alignment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Declared total size is smaller than the header itself
    #[error("Malformed header: declared size {size} is smaller than the {header_size}-byte header")]
    MalformedHeader { size: usize, header_size: usize },

    /// Buffer ends before the structure being decoded
    #[error("Truncated payload: need {need} bytes, got {got} (context: {context})")]
    TruncatedPayload {
        need: usize,
        got: usize,
        context: &'static str,
    },

    /// Payload does not fit the 24-bit size field
    #[error("Message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// Oracle request carries a kind code this codec does not know
    #[error("Unknown oracle request kind {code}")]
    UnknownRequestKind { code: u32 },
}

impl CodecError {
    pub fn truncated(need: usize, got: usize, context: &'static str) -> Self {
        Self::TruncatedPayload { need, got, context }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
