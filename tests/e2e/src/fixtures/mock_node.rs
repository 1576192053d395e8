//! Mock oracle node for testing
//!
//! Serves canned answers over the real wire protocol on loopback TCP. Every
//! reply to one request goes out in a single write, so a client always sees
//! a complete exchange or nothing.

use anyhow::{Context, Result};
use bytes::BytesMut;
use codec::{
    decode_header, decode_oracle_request, encode_current_tick_info, encode_message,
    encode_oracle_response, encode_query_ids, encode_query_statistics, encode_revenue_points,
    encode_tick_range, message_type, OracleRequest, RequestKind, ResponseKind, HEADER_SIZE,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use types::{CurrentTickInfo, QueryRecord, QueryStatistics, TickRange};

/// Four IPv4 peers, as carried by a peer-exchange message
const PEER_LIST: [u8; 16] = [10, 0, 0, 1, 10, 0, 0, 2, 10, 0, 0, 3, 10, 0, 0, 4];

/// What a mock node answers
#[derive(Debug, Clone)]
pub struct NodeBehavior {
    pub tick_info: CurrentTickInfo,
    /// `None` answers the statistics request with a bare terminator
    pub stats: Option<QueryStatistics>,
    pub pending_ids: Vec<i64>,
    /// Query ids per `QUERY_IDS` message when streaming lists
    pub ids_per_message: usize,
    /// `None` sends only the terminator for the range probe
    pub tick_range: Option<TickRange>,
    /// `None` answers revenue requests with a bare terminator
    pub revenue_points: Option<Vec<u64>>,
    pub queries_by_tick: HashMap<u32, Vec<i64>>,
    pub user_queries_by_tick: HashMap<u32, Vec<i64>>,
    /// Ticks answered with an undecodable response
    pub failing_ticks: HashSet<u32>,
    pub records: HashMap<i64, QueryRecord>,
    /// Peer-exchange messages sent ahead of every reply
    pub peer_exchange_noise: usize,
    /// Accept connections but never answer
    pub silent: bool,
}

impl Default for NodeBehavior {
    fn default() -> Self {
        Self {
            tick_info: CurrentTickInfo::default(),
            stats: None,
            pending_ids: Vec::new(),
            ids_per_message: 64,
            tick_range: None,
            revenue_points: None,
            queries_by_tick: HashMap::new(),
            user_queries_by_tick: HashMap::new(),
            failing_ticks: HashSet::new(),
            records: HashMap::new(),
            peer_exchange_noise: 0,
            silent: false,
        }
    }
}

/// Requests seen by a mock node
#[derive(Debug, Default)]
struct NodeLog {
    connections: AtomicUsize,
    requests: AtomicUsize,
    ticks_requested: Mutex<Vec<u32>>,
}

pub struct MockOracleNode {
    addr: SocketAddr,
    log: Arc<NodeLog>,
    handle: JoinHandle<()>,
}

impl MockOracleNode {
    /// Start on 127.0.0.1 with an ephemeral port
    pub async fn start(behavior: NodeBehavior) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        Ok(Self::serve(listener, behavior))
    }

    /// Start on a specific loopback address and port
    pub async fn start_on(ip: Ipv4Addr, port: u16, behavior: NodeBehavior) -> Result<Self> {
        let listener = TcpListener::bind((ip, port))
            .await
            .with_context(|| format!("Failed to bind mock node on {}:{}", ip, port))?;
        Ok(Self::serve(listener, behavior))
    }

    fn serve(listener: TcpListener, behavior: NodeBehavior) -> Self {
        let addr = listener
            .local_addr()
            .unwrap_or_else(|_| SocketAddr::from((Ipv4Addr::LOCALHOST, 0)));
        let log = Arc::new(NodeLog::default());
        let behavior = Arc::new(behavior);
        info!("Mock oracle node listening on {}", addr);

        let task_log = log.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, peer)) = listener.accept().await {
                debug!("Mock node {} accepted {}", addr, peer);
                task_log.connections.fetch_add(1, Ordering::Relaxed);
                let behavior = behavior.clone();
                let log = task_log.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &behavior, &log).await {
                        debug!("Mock node connection ended: {}", e);
                    }
                });
            }
        });

        Self { addr, log, handle }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ip(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connections(&self) -> usize {
        self.log.connections.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> usize {
        self.log.requests.load(Ordering::Relaxed)
    }

    /// Ticks asked for by per-tick id requests, in arrival order
    pub fn ticks_requested(&self) -> Vec<u32> {
        self.log.ticks_requested.lock().clone()
    }
}

impl Drop for MockOracleNode {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Several mock nodes on distinct loopback IPs sharing one port
///
/// The scanner uses a single port for every node, so a multi-node test needs
/// 127.0.0.1, 127.0.0.2, ... all listening on the same port.
pub struct MockCluster {
    pub nodes: Vec<MockOracleNode>,
    port: u16,
}

impl MockCluster {
    const BIND_ATTEMPTS: usize = 5;

    pub async fn start(behaviors: Vec<NodeBehavior>) -> Result<Self> {
        let mut last_error = None;
        for _ in 0..Self::BIND_ATTEMPTS {
            match Self::try_start(behaviors.clone()).await {
                Ok(cluster) => return Ok(cluster),
                Err(e) => {
                    warn!("Mock cluster bind failed, retrying: {}", e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no bind attempts made")))
    }

    async fn try_start(behaviors: Vec<NodeBehavior>) -> Result<Self> {
        let mut behaviors = behaviors.into_iter();
        let first = behaviors.next().context("Cluster needs at least one node")?;
        let first = MockOracleNode::start(first).await?;
        let port = first.port();

        let mut nodes = vec![first];
        for (offset, behavior) in behaviors.enumerate() {
            let ip = Ipv4Addr::new(127, 0, 0, offset as u8 + 2);
            nodes.push(MockOracleNode::start_on(ip, port, behavior).await?);
        }
        Ok(Self { nodes, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ips(&self) -> Vec<String> {
        self.nodes.iter().map(MockOracleNode::ip).collect()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    behavior: &NodeBehavior,
    log: &NodeLog,
) -> Result<()> {
    let mut raw_header = [0u8; HEADER_SIZE];
    loop {
        stream.read_exact(&mut raw_header).await?;
        let header = decode_header(&raw_header)?;
        let mut payload = vec![0u8; header.payload_size()];
        stream.read_exact(&mut payload).await?;
        log.requests.fetch_add(1, Ordering::Relaxed);

        if behavior.silent {
            continue;
        }

        let mut reply = BytesMut::new();
        for _ in 0..behavior.peer_exchange_noise {
            push(&mut reply, message_type::EXCHANGE_PUBLIC_PEERS, &PEER_LIST)?;
        }

        match header.message_type {
            message_type::REQUEST_CURRENT_TICK_INFO => {
                let info = encode_current_tick_info(&behavior.tick_info);
                push(&mut reply, message_type::RESPOND_CURRENT_TICK_INFO, &info)?;
            }
            message_type::REQUEST_ORACLE_DATA => {
                let request = decode_oracle_request(&payload)?;
                answer_oracle_request(&mut reply, request, behavior, log)?;
            }
            other => {
                debug!("Mock node ignoring message type {}", other);
                continue;
            }
        }

        stream.write_all(&reply).await?;
        stream.flush().await?;
    }
}

fn answer_oracle_request(
    reply: &mut BytesMut,
    request: OracleRequest,
    behavior: &NodeBehavior,
    log: &NodeLog,
) -> Result<()> {
    match request.kind {
        RequestKind::QueryStatistics => match &behavior.stats {
            Some(stats) => push_oracle(
                reply,
                ResponseKind::QueryStatistics,
                &encode_query_statistics(stats),
            )?,
            None => push_end(reply)?,
        },
        RequestKind::OracleRevenuePoints => match &behavior.revenue_points {
            Some(points) => push_oracle(
                reply,
                ResponseKind::OracleRevenuePoints,
                &encode_revenue_points(points),
            )?,
            None => push_end(reply)?,
        },
        RequestKind::PendingQueryIds => {
            push_query_ids(reply, &behavior.pending_ids, behavior.ids_per_message)?;
            push_end(reply)?;
        }
        RequestKind::AllQueryIdsByTick if request.argument == 0 => {
            if let Some(range) = &behavior.tick_range {
                push_oracle(reply, ResponseKind::TickRange, &encode_tick_range(range))?;
            }
            push_end(reply)?;
        }
        RequestKind::AllQueryIdsByTick => {
            let tick = request.argument as u32;
            log.ticks_requested.lock().push(tick);
            if behavior.failing_ticks.contains(&tick) {
                // Too short to carry a response-kind tag
                push(reply, message_type::RESPOND_ORACLE_DATA, &[0xFF])?;
            } else if let Some(ids) = behavior.queries_by_tick.get(&tick) {
                push_query_ids(reply, ids, behavior.ids_per_message)?;
            }
            push_end(reply)?;
        }
        RequestKind::UserQueryIdsByTick => {
            if let Some(ids) = behavior.user_queries_by_tick.get(&(request.argument as u32)) {
                push_query_ids(reply, ids, behavior.ids_per_message)?;
            }
            push_end(reply)?;
        }
        RequestKind::QueryAndResponse => {
            if let Some(record) = behavior.records.get(&request.argument) {
                if let Some(metadata) = &record.metadata {
                    push_oracle(reply, ResponseKind::QueryMetadata, metadata)?;
                }
                if let Some(query) = &record.query_data {
                    push_oracle(reply, ResponseKind::QueryData, query)?;
                }
                if let Some(answer) = &record.reply_data {
                    push_oracle(reply, ResponseKind::ReplyData, answer)?;
                }
            }
            push_end(reply)?;
        }
    }
    Ok(())
}

fn push(reply: &mut BytesMut, message_type: u8, payload: &[u8]) -> Result<()> {
    reply.extend_from_slice(&encode_message(message_type, payload)?);
    Ok(())
}

fn push_oracle(reply: &mut BytesMut, kind: ResponseKind, body: &[u8]) -> Result<()> {
    push(
        reply,
        message_type::RESPOND_ORACLE_DATA,
        &encode_oracle_response(kind, body),
    )
}

fn push_query_ids(reply: &mut BytesMut, ids: &[i64], per_message: usize) -> Result<()> {
    for chunk in ids.chunks(per_message.max(1)) {
        push_oracle(reply, ResponseKind::QueryIds, &encode_query_ids(chunk))?;
    }
    Ok(())
}

fn push_end(reply: &mut BytesMut) -> Result<()> {
    push(reply, message_type::END_RESPONSE, &[])
}
