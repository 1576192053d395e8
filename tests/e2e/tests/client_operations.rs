//! Query client operations against a mock oracle node

use oracle_e2e_tests::{healthy_node, init_test_tracing, sample_statistics, MockOracleNode, NodeBehavior};
use oracle_monitor::{OracleQueryClient, QueryError};
use std::collections::HashMap;
use std::time::Duration;
use types::{QueryRecord, TickRange, NUM_COMPUTORS};

const TIMEOUT: Duration = Duration::from_secs(2);

async fn client_for(node: &MockOracleNode) -> OracleQueryClient {
    let (client, _latency) = OracleQueryClient::connect(&node.ip(), node.port(), TIMEOUT, TIMEOUT)
        .await
        .expect("connect to mock node");
    client
}

#[tokio::test]
async fn test_current_tick_and_statistics() {
    init_test_tracing();
    let node = MockOracleNode::start(healthy_node(1_000)).await.unwrap();
    let mut client = client_for(&node).await;

    let info = client.get_current_tick().await.unwrap();
    assert_eq!(info.tick, 1_000);
    assert_eq!(info.epoch, 150);
    assert_eq!(info.tick_duration, 1_000);

    let stats = client.get_oracle_statistics().await.unwrap();
    assert_eq!(stats, sample_statistics());
    assert_eq!(stats.success_rate(), 96.0);

    client.close().await;
}

#[tokio::test]
async fn test_pending_ids_across_messages() {
    let behavior = NodeBehavior {
        pending_ids: (1..=10).collect(),
        ids_per_message: 3,
        ..healthy_node(1)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let mut client = client_for(&node).await;

    let ids = client.get_pending_query_ids().await.unwrap();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());

    let empty = MockOracleNode::start(healthy_node(1)).await.unwrap();
    let mut client = client_for(&empty).await;
    assert!(client.get_pending_query_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tick_range_present_and_missing() {
    let node = MockOracleNode::start(healthy_node(1_000)).await.unwrap();
    let mut client = client_for(&node).await;
    assert_eq!(
        client.get_tick_range().await.unwrap(),
        Some(TickRange::new(500, 1_000))
    );

    let without = NodeBehavior {
        tick_range: None,
        ..healthy_node(1_000)
    };
    let node = MockOracleNode::start(without).await.unwrap();
    let mut client = client_for(&node).await;
    assert_eq!(client.get_tick_range().await.unwrap(), None);
}

#[tokio::test]
async fn test_revenue_points_supported_and_not() {
    let mut points = vec![0u64; NUM_COMPUTORS];
    points[3] = 50;
    points[10] = 70;
    let behavior = NodeBehavior {
        revenue_points: Some(points),
        ..healthy_node(1)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let mut client = client_for(&node).await;

    let revenue = client.get_revenue_points().await.unwrap();
    assert_eq!(revenue.len(), NUM_COMPUTORS);
    assert_eq!(revenue.total_revenue(), 120);
    assert_eq!(revenue.active_computors(), 2);
    assert_eq!(revenue.top_computors()[0].index, 10);

    // A node without support answers with the terminator only
    let node = MockOracleNode::start(healthy_node(1)).await.unwrap();
    let mut client = client_for(&node).await;
    assert!(client.get_revenue_points().await.is_none());
    // The connection stays usable afterwards
    assert_eq!(client.get_current_tick().await.unwrap().tick, 1);
}

#[tokio::test]
async fn test_per_tick_and_user_query_ids() {
    let behavior = NodeBehavior {
        queries_by_tick: HashMap::from([(900, vec![11, 12, 13])]),
        user_queries_by_tick: HashMap::from([(900, vec![12])]),
        ..healthy_node(1_000)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let mut client = client_for(&node).await;

    assert_eq!(client.get_query_ids_at_tick(900).await.unwrap(), vec![11, 12, 13]);
    assert_eq!(client.get_user_query_ids_at_tick(900).await.unwrap(), vec![12]);
    assert!(client.get_query_ids_at_tick(901).await.unwrap().is_empty());
    assert_eq!(node.ticks_requested(), vec![900, 901]);
}

#[tokio::test]
async fn test_query_and_response() {
    let answered = QueryRecord {
        query_id: 77,
        metadata: Some(vec![1, 2]),
        query_data: Some(b"price?".to_vec()),
        reply_data: Some(b"42".to_vec()),
    };
    let behavior = NodeBehavior {
        records: HashMap::from([(77, answered.clone())]),
        ..healthy_node(1)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let mut client = client_for(&node).await;

    let record = client.get_query_and_response(77).await.unwrap();
    assert_eq!(record, answered);
    assert!(record.is_answered());

    let unknown = client.get_query_and_response(78).await.unwrap();
    assert_eq!(unknown.query_id, 78);
    assert!(unknown.metadata.is_none());
    assert!(!unknown.is_answered());
}

#[tokio::test]
async fn test_peer_exchange_noise_is_skipped() {
    let behavior = NodeBehavior {
        peer_exchange_noise: 3,
        pending_ids: vec![5, 6],
        ..healthy_node(2_000)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let mut client = client_for(&node).await;

    assert_eq!(client.get_current_tick().await.unwrap().tick, 2_000);
    assert_eq!(client.get_oracle_statistics().await.unwrap(), sample_statistics());
    assert_eq!(client.get_pending_query_ids().await.unwrap(), vec![5, 6]);
}

#[tokio::test]
async fn test_missing_statistics_is_an_error() {
    let behavior = NodeBehavior {
        stats: None,
        ..healthy_node(1)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let mut client = client_for(&node).await;

    let err = client.get_oracle_statistics().await.unwrap_err();
    assert!(matches!(err, QueryError::UnexpectedMessageType { .. }));
}

#[tokio::test]
async fn test_silent_node_times_out() {
    let behavior = NodeBehavior {
        silent: true,
        ..healthy_node(1)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();
    let (mut client, _) = OracleQueryClient::connect(
        &node.ip(),
        node.port(),
        TIMEOUT,
        Duration::from_millis(200),
    )
    .await
    .unwrap();

    let err = client.get_current_tick().await.unwrap_err();
    assert!(err.is_timeout());
}
