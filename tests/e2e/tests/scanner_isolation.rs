//! Per-node scan policy and cross-node failure isolation

use oracle_e2e_tests::{healthy_node, init_test_tracing, MockCluster, MockOracleNode, NodeBehavior};
use oracle_monitor::{scan_node, NodeScanner, ScanSettings};
use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;
use types::{NodeStatus, TickRange};

fn settings(port: u16) -> ScanSettings {
    ScanSettings {
        port,
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_millis(500),
    }
}

/// A loopback port with nothing listening on it
fn closed_port() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_healthy_node_fills_every_field() {
    init_test_tracing();
    let behavior = NodeBehavior {
        pending_ids: vec![9, 4],
        revenue_points: Some(vec![1, 2, 3]),
        ..healthy_node(1_000)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();

    let result = scan_node(node.ip(), settings(node.port())).await;
    assert_eq!(result.status, NodeStatus::Connected);
    assert_eq!(result.tick, 1_000);
    assert_eq!(result.epoch, 150);
    assert!(result.stats.is_some());
    assert_eq!(result.pending_ids, vec![9, 4]);
    assert_eq!(result.tick_range, Some(TickRange::new(500, 1_000)));
    assert_eq!(result.revenue_points.unwrap().total_revenue(), 6);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_refused_connection_is_offline() {
    let result = scan_node("127.0.0.1".to_string(), settings(closed_port())).await;
    assert_eq!(result.status, NodeStatus::Offline);
    assert!(result.error.is_some());
    assert!(result.stats.is_none());
    assert_eq!(result.tick, 0);
}

#[tokio::test]
async fn test_current_tick_failure_is_fatal() {
    let behavior = NodeBehavior {
        silent: true,
        ..healthy_node(1_000)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();

    let result = scan_node(node.ip(), settings(node.port())).await;
    assert_eq!(result.status, NodeStatus::Offline);
    assert!(result.error.unwrap().contains("timed out"));
    // No further queries after the current-tick failure
    assert_eq!(node.requests(), 1);
}

#[tokio::test]
async fn test_statistics_failure_is_soft() {
    let behavior = NodeBehavior {
        stats: None,
        pending_ids: vec![1],
        ..healthy_node(1_000)
    };
    let node = MockOracleNode::start(behavior).await.unwrap();

    let result = scan_node(node.ip(), settings(node.port())).await;
    assert_eq!(result.status, NodeStatus::Connected);
    assert!(result.stats.is_none());
    assert!(result.error.unwrap().starts_with("statistics"));
    assert_eq!(result.pending_ids, vec![1]);
    assert!(result.tick_range.is_some());
}

#[tokio::test]
async fn test_one_dead_node_does_not_affect_others() {
    init_test_tracing();
    let silent = NodeBehavior {
        silent: true,
        ..healthy_node(1_000)
    };
    let cluster = MockCluster::start(vec![healthy_node(1_000), silent, healthy_node(1_001)])
        .await
        .unwrap();

    let mut ips = cluster.ips();
    // Loopback address with nothing bound to the cluster port
    ips.insert(1, "127.0.0.200".to_string());

    let scanner = NodeScanner::new(settings(cluster.port()));
    let outcome = scanner.scan_all_nodes(&ips).await;

    let statuses: Vec<NodeStatus> = outcome.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            NodeStatus::Connected,
            NodeStatus::Offline,
            NodeStatus::Offline,
            NodeStatus::Connected,
        ]
    );
    let result_ips: Vec<&str> = outcome.results.iter().map(|r| r.ip.as_str()).collect();
    assert_eq!(result_ips, ips.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(outcome.results[3].tick, 1_001);
}

#[tokio::test]
async fn test_silent_nodes_time_out_concurrently() {
    let silent = NodeBehavior {
        silent: true,
        ..healthy_node(1_000)
    };
    let cluster = MockCluster::start(vec![silent; 4]).await.unwrap();
    let settings = settings(cluster.port());
    let read_timeout = settings.read_timeout;

    let outcome = NodeScanner::new(settings)
        .scan_all_nodes(&cluster.ips())
        .await;

    assert_eq!(outcome.results.len(), 4);
    assert!(outcome
        .results
        .iter()
        .all(|r| r.status == NodeStatus::Offline));
    // Bounded by the slowest node, not the sum over nodes
    assert!(
        (outcome.scan_duration_ms as u128) < 2 * read_timeout.as_millis(),
        "scan took {}ms",
        outcome.scan_duration_ms
    );
}

#[tokio::test]
async fn test_empty_node_list() {
    let outcome = NodeScanner::default().scan_all_nodes(&[]).await;
    assert!(outcome.results.is_empty());
}
