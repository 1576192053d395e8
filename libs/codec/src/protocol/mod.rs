//! Oracle request and response kinds
//!
//! Every oracle exchange is a `REQUEST_ORACLE_DATA` message carrying an
//! [`OracleRequest`], answered by one or more `RESPOND_ORACLE_DATA` messages
//! whose payloads start with a response-kind tag.

use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// What an oracle request asks for
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum RequestKind {
    /// Every query id registered at the tick given as argument
    AllQueryIdsByTick = 0,
    /// Only user-submitted query ids at the tick given as argument
    UserQueryIdsByTick = 1,
    PendingQueryIds = 4,
    /// Metadata, query and reply of the query id given as argument
    QueryAndResponse = 5,
    QueryStatistics = 7,
    OracleRevenuePoints = 8,
}

/// Tag at the start of every oracle response payload
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum ResponseKind {
    QueryIds = 0,
    QueryMetadata = 1,
    QueryData = 2,
    ReplyData = 3,
    QueryStatistics = 7,
    OracleRevenuePoints = 8,
    TickRange = 9,
}

/// Decoded oracle request payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleRequest {
    pub kind: RequestKind,
    /// Tick number or query id, depending on `kind`
    pub argument: i64,
}

/// Oracle response envelope: kind tag plus kind-specific payload
///
/// The raw kind code is kept so callers can skip tags they do not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    pub kind_code: u32,
    pub payload: Bytes,
}

impl OracleResponse {
    pub fn kind(&self) -> Option<ResponseKind> {
        ResponseKind::try_from(self.kind_code).ok()
    }

    pub fn is(&self, kind: ResponseKind) -> bool {
        self.kind_code == u32::from(kind)
    }
}
