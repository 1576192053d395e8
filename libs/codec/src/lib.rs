//! # Oracle Node Wire Codec
//!
//! ## Purpose
//!
//! The "rules" layer of the oracle monitor: byte layouts of the node wire
//! protocol and nothing else.
//! - 8-byte framing header (24-bit size, type, opaque nonce)
//! - Oracle request payloads
//! - Oracle response envelope and its typed payloads (statistics, revenue
//!   points, tick range, query ids) plus current-tick info
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → network/
//!     ↑           ↓          ↓
//! Pure Data   Encoding   Transport
//! Structures  Decoding   Connections
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Socket management, buffering or timeouts (belongs in network/)
//! - Query sequencing or response interpretation (belongs in the monitor)

pub mod builder;
pub mod constants;
pub mod error;
pub mod parser;
pub mod protocol;

pub use builder::{
    encode_current_tick_info, encode_header, encode_message, encode_oracle_request,
    encode_oracle_response, encode_query_ids, encode_query_statistics, encode_revenue_points,
    encode_tick_range,
};
pub use constants::*;
pub use error::{CodecError, CodecResult};
pub use parser::{
    decode_current_tick_info, decode_header, decode_oracle_request, decode_oracle_response,
    decode_query_ids, decode_query_statistics, decode_revenue_points, decode_tick_range, Header,
};
pub use protocol::{OracleRequest, OracleResponse, RequestKind, ResponseKind};
