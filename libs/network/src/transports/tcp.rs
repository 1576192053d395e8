//! TCP Node Transport Implementation
//!
//! One TCP connection to one node. Inbound bytes are appended to a single
//! growable receive buffer and framed messages are drained from its front,
//! so a message split across several TCP segments (or several messages in
//! one segment) reassemble transparently.
//!
//! The node protocol has no request ids: callers must keep at most one
//! request outstanding per transport and drain its reply before the next.

use super::Message;
use crate::{Result, TransportError};
use bytes::{Buf, BytesMut};
use codec::{decode_header, encode_header, message_type, HEADER_SIZE};
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Peer exchange messages tolerated in front of one awaited reply
pub const MAX_PEER_EXCHANGE_SKIPS: usize = 10;

/// Initial receive buffer capacity
const RECEIVE_BUFFER_CAPACITY: usize = 64 * 1024;

/// Connection lifecycle. There is no path back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// TCP connection statistics
#[derive(Debug, Clone)]
pub struct TransportStats {
    pub peer_addr: Option<SocketAddr>,
    pub connected_duration: Option<Duration>,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub messages_received: u64,
    pub peer_exchanges_skipped: u64,
}

/// Framed TCP transport to a single node
pub struct NodeTransport {
    state: ConnectionState,
    stream: Option<TcpStream>,
    peer_addr: Option<SocketAddr>,
    connected_at: Option<Instant>,
    /// Receive buffer; consumers drain from the front
    buffer: BytesMut,
    /// Reusable write buffer
    write_buffer: BytesMut,
    bytes_sent: u64,
    bytes_received: u64,
    messages_received: u64,
    peer_exchanges_skipped: u64,
}

impl Default for NodeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTransport {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            stream: None,
            peer_addr: None,
            connected_at: None,
            buffer: BytesMut::with_capacity(RECEIVE_BUFFER_CAPACITY),
            write_buffer: BytesMut::with_capacity(HEADER_SIZE + 64),
            bytes_sent: 0,
            bytes_received: 0,
            messages_received: 0,
            peer_exchanges_skipped: 0,
        }
    }

    /// Connect to `ip:port`, returning the wall-clock connect latency in ms
    pub async fn connect(&mut self, ip: &str, port: u16, timeout: Duration) -> Result<u64> {
        if self.state != ConnectionState::Disconnected {
            return Err(TransportError::InvalidState {
                operation: "connect",
                state: self.state.to_string(),
            });
        }

        let addr = format!("{}:{}", ip, port);
        debug!(%addr, "Connecting to node");
        self.state = ConnectionState::Connecting;
        let started = Instant::now();

        let connected = tokio::time::timeout(timeout, TcpStream::connect((ip, port))).await;
        let stream = match connected {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                self.state = ConnectionState::Closed;
                return Err(TransportError::Connect { addr, source });
            }
            Err(_) => {
                self.state = ConnectionState::Closed;
                return Err(TransportError::ConnectTimeout {
                    addr,
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        self.peer_addr = stream.peer_addr().ok();
        self.stream = Some(stream);
        self.connected_at = Some(Instant::now());
        self.state = ConnectionState::Connected;

        info!(%addr, latency_ms, "Connected to node");
        Ok(latency_ms)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Bytes received but not yet consumed as messages
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discard everything buffered, e.g. the tail of an abandoned reply
    pub fn clear_buffer(&mut self) {
        if !self.buffer.is_empty() {
            debug!(discarded = self.buffer.len(), "Clearing receive buffer");
        }
        self.buffer.clear();
    }

    /// Write one framed message
    pub async fn send(&mut self, message_type: u8, payload: &[u8], timeout: Duration) -> Result<()> {
        let header = encode_header(payload.len(), message_type)?;
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(&header);
        self.write_buffer.extend_from_slice(payload);

        let data = &self.write_buffer[..];
        let len = data.len();
        let write = async move {
            stream.write_all(data).await?;
            stream.flush().await
        };
        tokio::time::timeout(timeout, write)
            .await
            .map_err(|_| TransportError::WriteTimeout {
                bytes: len,
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| TransportError::io("Failed to write message", e))?;

        self.bytes_sent += len as u64;
        debug!(
            peer = ?self.peer_addr,
            message_type,
            bytes = len,
            "Sent message"
        );
        Ok(())
    }

    /// Read exactly one framed message
    ///
    /// Waits for a full header, then for the full payload; each wait is
    /// bounded by `timeout` on its own.
    pub async fn read_exact_message(&mut self, timeout: Duration) -> Result<Message> {
        self.fill_buffer(HEADER_SIZE, timeout).await?;
        let header = decode_header(&self.buffer[..HEADER_SIZE])?;

        self.fill_buffer(header.size, timeout).await?;
        self.buffer.advance(HEADER_SIZE);
        let payload = self.buffer.split_to(header.payload_size()).freeze();

        self.messages_received += 1;
        debug!(
            message_type = header.message_type,
            payload_len = payload.len(),
            remaining = self.buffer.len(),
            "Received message"
        );

        Ok(Message {
            message_type: header.message_type,
            payload,
        })
    }

    /// Read the next message that is not an unsolicited peer exchange
    pub async fn read_message_skipping_peer_exchange(&mut self, timeout: Duration) -> Result<Message> {
        let mut skipped = 0;
        loop {
            let message = self.read_exact_message(timeout).await?;
            if message.message_type != message_type::EXCHANGE_PUBLIC_PEERS {
                return Ok(message);
            }

            skipped += 1;
            self.peer_exchanges_skipped += 1;
            if skipped > MAX_PEER_EXCHANGE_SKIPS {
                return Err(TransportError::TooManyPeerExchanges {
                    limit: MAX_PEER_EXCHANGE_SKIPS,
                });
            }
            debug!(skipped, "Skipped peer exchange message");
        }
    }

    /// Read messages until `END_RESPONSE`; the terminator is not returned
    pub async fn read_multi_message_response(&mut self, timeout: Duration) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        loop {
            let message = self.read_message_skipping_peer_exchange(timeout).await?;
            if message.message_type == message_type::END_RESPONSE {
                debug!(count = messages.len(), "Multi-message response complete");
                return Ok(messages);
            }
            messages.push(message);
        }
    }

    /// Best-effort shutdown; safe to call repeatedly
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Error shutting down TCP connection: {}", e);
            }
            debug!(peer = ?self.peer_addr, "Closed node connection");
        }
        self.buffer.clear();
        self.state = ConnectionState::Closed;
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            peer_addr: self.peer_addr,
            connected_duration: self.connected_at.map(|t| t.elapsed()),
            bytes_sent: self.bytes_sent,
            bytes_received: self.bytes_received,
            messages_received: self.messages_received,
            peer_exchanges_skipped: self.peer_exchanges_skipped,
        }
    }

    /// Read from the socket until at least `len` bytes are buffered
    async fn fill_buffer(&mut self, len: usize, timeout: Duration) -> Result<()> {
        if self.buffer.len() >= len {
            return Ok(());
        }

        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        let deadline = tokio::time::Instant::now() + timeout;

        while self.buffer.len() < len {
            self.buffer.reserve(len - self.buffer.len());
            let result = tokio::time::timeout_at(deadline, stream.read_buf(&mut self.buffer)).await;
            let read = match result {
                Ok(Ok(read)) => read,
                Ok(Err(e)) => return Err(TransportError::io("Failed to read from node", e)),
                Err(_) => {
                    return Err(TransportError::ReadTimeout {
                        timeout_ms: timeout.as_millis() as u64,
                        wanted: len,
                        buffered: self.buffer.len(),
                    })
                }
            };

            if read == 0 {
                return Err(TransportError::ConnectionClosed {
                    buffered: self.buffer.len(),
                });
            }
            self.bytes_received += read as u64;
        }
        Ok(())
    }
}
