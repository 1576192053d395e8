//! Oracle query client
//!
//! One client per node, wrapping one [`NodeTransport`]. Every operation
//! follows the same sequence:
//!
//! 1. clear the receive buffer, so bytes left over from an earlier timed-out
//!    or abandoned exchange are never taken as this request's reply
//! 2. write one framed request
//! 3. read the reply (single message, or messages up to `END_RESPONSE`)
//! 4. decode into a typed result
//!
//! The protocol has no request ids, so operations take `&mut self` and run
//! strictly one at a time.

use crate::error::{QueryError, Result};
use bytes::Bytes;
use codec::{
    decode_current_tick_info, decode_oracle_response, decode_query_ids,
    decode_query_statistics, decode_revenue_points, decode_tick_range, encode_oracle_request,
    message_type, OracleResponse, RequestKind, ResponseKind,
};
use network::{Message, NodeTransport};
use std::time::Duration;
use tracing::debug;
use types::{CurrentTickInfo, QueryRecord, QueryStatistics, RevenuePoints, TickRange};

/// Tick argument no node stores data for; nodes answer it with their range
const TICK_RANGE_PROBE: i64 = 0;

pub struct OracleQueryClient {
    ip: String,
    transport: NodeTransport,
    timeout: Duration,
}

impl OracleQueryClient {
    /// Wrap an already connected transport
    pub fn new(ip: impl Into<String>, transport: NodeTransport, timeout: Duration) -> Self {
        Self {
            ip: ip.into(),
            transport,
            timeout,
        }
    }

    /// Connect to `ip:port`; returns the client and the connect latency in ms
    pub async fn connect(
        ip: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<(Self, u64)> {
        let mut transport = NodeTransport::new();
        let latency_ms = transport.connect(ip, port, connect_timeout).await?;
        Ok((Self::new(ip, transport, read_timeout), latency_ms))
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn transport(&self) -> &NodeTransport {
        &self.transport
    }

    pub async fn get_current_tick(&mut self) -> Result<CurrentTickInfo> {
        self.request(message_type::REQUEST_CURRENT_TICK_INFO, &[])
            .await?;
        let message = self
            .transport
            .read_message_skipping_peer_exchange(self.timeout)
            .await?;
        expect_type(&message, message_type::RESPOND_CURRENT_TICK_INFO)?;

        let info = decode_current_tick_info(&message.payload)?;
        debug!(node = %self.ip, tick = info.tick, epoch = info.epoch, "Current tick");
        Ok(info)
    }

    pub async fn get_oracle_statistics(&mut self) -> Result<QueryStatistics> {
        self.oracle_request(RequestKind::QueryStatistics, 0).await?;
        let payload = self.read_single_response(ResponseKind::QueryStatistics).await?;
        Ok(decode_query_statistics(&payload)?)
    }

    pub async fn get_pending_query_ids(&mut self) -> Result<Vec<i64>> {
        self.oracle_request(RequestKind::PendingQueryIds, 0).await?;
        self.read_query_ids().await
    }

    /// The node's stored tick range, or `None` if it did not send one
    pub async fn get_tick_range(&mut self) -> Result<Option<TickRange>> {
        self.oracle_request(RequestKind::AllQueryIdsByTick, TICK_RANGE_PROBE)
            .await?;
        let responses = self.read_multi_response().await?;

        let range = responses
            .iter()
            .find(|r| r.is(ResponseKind::TickRange))
            .map(|r| decode_tick_range(&r.payload))
            .transpose()?;
        if range.is_none() {
            debug!(node = %self.ip, "Node sent no tick range");
        }
        Ok(range)
    }

    /// Revenue points, or `None` if the node does not support them
    ///
    /// Support varies by node version, so any failure here is expected and
    /// only logged.
    pub async fn get_revenue_points(&mut self) -> Option<RevenuePoints> {
        match self.fetch_revenue_points().await {
            Ok(points) => Some(points),
            Err(e) => {
                debug!(node = %self.ip, error = %e, "Revenue points unavailable");
                None
            }
        }
    }

    pub async fn get_query_ids_at_tick(&mut self, tick: u32) -> Result<Vec<i64>> {
        self.oracle_request(RequestKind::AllQueryIdsByTick, i64::from(tick))
            .await?;
        self.read_query_ids().await
    }

    /// Query ids at `tick` that were submitted by users
    pub async fn get_user_query_ids_at_tick(&mut self, tick: u32) -> Result<Vec<i64>> {
        self.oracle_request(RequestKind::UserQueryIdsByTick, i64::from(tick))
            .await?;
        self.read_query_ids().await
    }

    /// Metadata, query and reply blobs stored for `query_id`
    pub async fn get_query_and_response(&mut self, query_id: i64) -> Result<QueryRecord> {
        self.oracle_request(RequestKind::QueryAndResponse, query_id)
            .await?;
        let responses = self.read_multi_response().await?;

        let mut record = QueryRecord {
            query_id,
            ..Default::default()
        };
        for response in responses {
            let blob = response.payload.to_vec();
            match response.kind() {
                Some(ResponseKind::QueryMetadata) => record.metadata = Some(blob),
                Some(ResponseKind::QueryData) => record.query_data = Some(blob),
                Some(ResponseKind::ReplyData) => record.reply_data = Some(blob),
                _ => debug!(kind = response.kind_code, "Ignoring response part"),
            }
        }
        Ok(record)
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    async fn fetch_revenue_points(&mut self) -> Result<RevenuePoints> {
        self.oracle_request(RequestKind::OracleRevenuePoints, 0)
            .await?;
        let payload = self
            .read_single_response(ResponseKind::OracleRevenuePoints)
            .await?;
        Ok(decode_revenue_points(&payload))
    }

    async fn request(&mut self, message_type: u8, payload: &[u8]) -> Result<()> {
        self.transport.clear_buffer();
        self.transport
            .send(message_type, payload, self.timeout)
            .await?;
        Ok(())
    }

    async fn oracle_request(&mut self, kind: RequestKind, argument: i64) -> Result<()> {
        debug!(node = %self.ip, ?kind, argument, "Oracle request");
        let payload = encode_oracle_request(kind, argument);
        self.request(message_type::REQUEST_ORACLE_DATA, &payload)
            .await
    }

    /// Read one oracle response and return its body if the kind matches
    async fn read_single_response(&mut self, expected: ResponseKind) -> Result<Bytes> {
        let message = self
            .transport
            .read_message_skipping_peer_exchange(self.timeout)
            .await?;
        expect_type(&message, message_type::RESPOND_ORACLE_DATA)?;

        let response = decode_oracle_response(&message.payload)?;
        if !response.is(expected) {
            return Err(QueryError::UnexpectedResponseKind {
                expected: expected.into(),
                actual: response.kind_code,
            });
        }
        Ok(response.payload)
    }

    /// Read oracle responses up to the terminator, dropping foreign messages
    async fn read_multi_response(&mut self) -> Result<Vec<OracleResponse>> {
        let messages = self
            .transport
            .read_multi_message_response(self.timeout)
            .await?;

        let mut responses = Vec::with_capacity(messages.len());
        for message in messages {
            if !message.is(message_type::RESPOND_ORACLE_DATA) {
                debug!(message_type = message.message_type, "Ignoring non-oracle message");
                continue;
            }
            responses.push(decode_oracle_response(&message.payload)?);
        }
        Ok(responses)
    }

    async fn read_query_ids(&mut self) -> Result<Vec<i64>> {
        let ids: Vec<i64> = self
            .read_multi_response()
            .await?
            .iter()
            .filter(|r| r.is(ResponseKind::QueryIds))
            .flat_map(|r| decode_query_ids(&r.payload))
            .collect();
        debug!(node = %self.ip, count = ids.len(), "Query ids");
        Ok(ids)
    }
}

fn expect_type(message: &Message, expected: u8) -> Result<()> {
    if message.message_type != expected {
        return Err(QueryError::UnexpectedMessageType {
            expected,
            actual: message.message_type,
        });
    }
    Ok(())
}
