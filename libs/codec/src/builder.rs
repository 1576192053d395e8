//! # Message Builder - Wire Encoding
//!
//! Encoders for the framing header, oracle requests and the oracle response
//! payloads. The client only needs [`encode_header`] and
//! [`encode_oracle_request`]; the response encoders exist for the responder
//! side (test nodes, replay tools) and mirror the decoders in
//! [`crate::parser`] byte for byte.

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::protocol::{RequestKind, ResponseKind};
use bytes::{BufMut, Bytes, BytesMut};
use types::{CurrentTickInfo, QueryStatistics, TickRange};

/// Encode the 8-byte header for a message carrying `payload_size` bytes
///
/// Bytes 4..8 are filled with random noise; nodes ignore them.
pub fn encode_header(payload_size: usize, message_type: u8) -> CodecResult<[u8; HEADER_SIZE]> {
    let size = HEADER_SIZE + payload_size;
    if size > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let nonce: [u8; 4] = rand::random();
    Ok([
        (size & 0xFF) as u8,
        ((size >> 8) & 0xFF) as u8,
        ((size >> 16) & 0xFF) as u8,
        message_type,
        nonce[0],
        nonce[1],
        nonce[2],
        nonce[3],
    ])
}

/// Encode a complete framed message
pub fn encode_message(message_type: u8, payload: &[u8]) -> CodecResult<Bytes> {
    let header = encode_header(payload.len(), message_type)?;
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_slice(&header);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Encode the 16-byte oracle request payload
pub fn encode_oracle_request(kind: RequestKind, argument: i64) -> [u8; ORACLE_REQUEST_SIZE] {
    let mut out = [0u8; ORACLE_REQUEST_SIZE];
    out[..4].copy_from_slice(&u32::from(kind).to_le_bytes());
    // bytes 4..8 stay reserved zero
    out[8..].copy_from_slice(&argument.to_le_bytes());
    out
}

/// Prefix `payload` with its response-kind tag
pub fn encode_oracle_response(kind: ResponseKind, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(RESPONSE_KIND_SIZE + payload.len());
    buf.put_u32_le(kind.into());
    buf.put_slice(payload);
    buf
}

pub fn encode_query_statistics(stats: &QueryStatistics) -> Vec<u8> {
    let mut buf = Vec::with_capacity(QUERY_STATISTICS_SIZE);
    for value in stats.values() {
        buf.put_u64_le(value);
    }
    buf
}

pub fn encode_revenue_points(points: &[u64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(points.len() * REVENUE_POINT_SIZE);
    for p in points {
        buf.put_u64_le(*p);
    }
    buf
}

pub fn encode_tick_range(range: &TickRange) -> [u8; TICK_RANGE_SIZE] {
    let mut out = [0u8; TICK_RANGE_SIZE];
    out[..4].copy_from_slice(&range.first_tick.to_le_bytes());
    out[4..].copy_from_slice(&range.current_tick.to_le_bytes());
    out
}

pub fn encode_query_ids(ids: &[i64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ids.len() * QUERY_ID_SIZE);
    for id in ids {
        buf.put_i64_le(*id);
    }
    buf
}

pub fn encode_current_tick_info(info: &CurrentTickInfo) -> [u8; CURRENT_TICK_INFO_SIZE] {
    let mut buf = Vec::with_capacity(CURRENT_TICK_INFO_SIZE);
    buf.put_u16_le(info.tick_duration);
    buf.put_u16_le(info.epoch);
    buf.put_u32_le(info.tick);
    buf.put_u16_le(info.aligned_votes);
    buf.put_u16_le(info.misaligned_votes);
    buf.put_u32_le(info.initial_tick);

    let mut out = [0u8; CURRENT_TICK_INFO_SIZE];
    out.copy_from_slice(&buf);
    out
}
