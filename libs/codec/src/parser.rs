//! # Message Parser - Wire Decoding
//!
//! Decoders for the framing header and oracle payloads. All functions are
//! pure and operate on byte slices; buffering and I/O live in the network
//! crate.
//!
//! Fixed-size structures fail with [`CodecError::TruncatedPayload`] when the
//! buffer is short. Array payloads (query ids, revenue points) decode whole
//! 8-byte strides and ignore a trailing partial stride, since nodes are free
//! to send fewer entries than the maximum.

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::protocol::{OracleRequest, OracleResponse, RequestKind};
use bytes::{Buf, Bytes};
use types::{CurrentTickInfo, QueryStatistics, RevenuePoints, TickRange, NUM_COMPUTORS};

/// Decoded framing header
///
/// The 4 nonce bytes carry no meaning and are not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total message size, header included
    pub size: usize,
    pub message_type: u8,
}

impl Header {
    pub fn payload_size(&self) -> usize {
        self.size.saturating_sub(HEADER_SIZE)
    }
}

/// Decode the framing header from the first 8 bytes of `data`
pub fn decode_header(data: &[u8]) -> CodecResult<Header> {
    if data.len() < HEADER_SIZE {
        return Err(CodecError::truncated(HEADER_SIZE, data.len(), "message header"));
    }

    let size = data[0] as usize | (data[1] as usize) << 8 | (data[2] as usize) << 16;
    if size < HEADER_SIZE {
        return Err(CodecError::MalformedHeader {
            size,
            header_size: HEADER_SIZE,
        });
    }

    Ok(Header {
        size,
        message_type: data[3],
    })
}

pub fn decode_oracle_request(data: &[u8]) -> CodecResult<OracleRequest> {
    if data.len() < ORACLE_REQUEST_SIZE {
        return Err(CodecError::truncated(
            ORACLE_REQUEST_SIZE,
            data.len(),
            "oracle request",
        ));
    }

    let mut buf = data;
    let code = buf.get_u32_le();
    buf.advance(4);
    let argument = buf.get_i64_le();

    let kind = RequestKind::try_from(code).map_err(|_| CodecError::UnknownRequestKind { code })?;
    Ok(OracleRequest { kind, argument })
}

/// Split an oracle response payload into kind tag and body (zero-copy)
pub fn decode_oracle_response(payload: &Bytes) -> CodecResult<OracleResponse> {
    if payload.len() < RESPONSE_KIND_SIZE {
        return Err(CodecError::truncated(
            RESPONSE_KIND_SIZE,
            payload.len(),
            "oracle response kind",
        ));
    }

    let mut tag = &payload[..RESPONSE_KIND_SIZE];
    Ok(OracleResponse {
        kind_code: tag.get_u32_le(),
        payload: payload.slice(RESPONSE_KIND_SIZE..),
    })
}

pub fn decode_query_statistics(data: &[u8]) -> CodecResult<QueryStatistics> {
    if data.len() < QUERY_STATISTICS_SIZE {
        return Err(CodecError::truncated(
            QUERY_STATISTICS_SIZE,
            data.len(),
            "query statistics",
        ));
    }

    let mut buf = data;
    let values: [u64; QueryStatistics::FIELD_COUNT] = std::array::from_fn(|_| buf.get_u64_le());
    Ok(QueryStatistics::from_values(values))
}

pub fn decode_revenue_points(data: &[u8]) -> RevenuePoints {
    let usable = data.len().min(NUM_COMPUTORS * REVENUE_POINT_SIZE);
    let points = data[..usable]
        .chunks_exact(REVENUE_POINT_SIZE)
        .map(|mut chunk| chunk.get_u64_le())
        .collect();
    RevenuePoints::new(points)
}

pub fn decode_tick_range(data: &[u8]) -> CodecResult<TickRange> {
    if data.len() < TICK_RANGE_SIZE {
        return Err(CodecError::truncated(TICK_RANGE_SIZE, data.len(), "tick range"));
    }

    let mut buf = data;
    let first_tick = buf.get_u32_le();
    let current_tick = buf.get_u32_le();
    Ok(TickRange::new(first_tick, current_tick))
}

pub fn decode_query_ids(data: &[u8]) -> Vec<i64> {
    data.chunks_exact(QUERY_ID_SIZE)
        .map(|mut chunk| chunk.get_i64_le())
        .collect()
}

pub fn decode_current_tick_info(data: &[u8]) -> CodecResult<CurrentTickInfo> {
    if data.len() < CURRENT_TICK_INFO_SIZE {
        return Err(CodecError::truncated(
            CURRENT_TICK_INFO_SIZE,
            data.len(),
            "current tick info",
        ));
    }

    let mut buf = data;
    Ok(CurrentTickInfo {
        tick_duration: buf.get_u16_le(),
        epoch: buf.get_u16_le(),
        tick: buf.get_u32_le(),
        aligned_votes: buf.get_u16_le(),
        misaligned_votes: buf.get_u16_le(),
        initial_tick: buf.get_u32_le(),
    })
}
