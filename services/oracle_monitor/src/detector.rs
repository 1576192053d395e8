//! Anomaly detector
//!
//! Rule engine over a [`ConsensusView`]. Every rule is checked on its own;
//! rules never suppress each other, so one view can raise several anomalies.
//!
//! | Rule | Severity |
//! |---|---|
//! | fewer than `min_connected_nodes` connected | CRITICAL |
//! | success rate below `critical_success_rate` | CRITICAL |
//! | tick drift of `max_tick_drift` or more | WARNING |
//! | pending count above `max_pending` | WARNING |
//! | any statistics disagreement | WARNING |
//! | success rate below `healthy_success_rate` | INFO |
//! | wrong knowledge proofs reported | INFO |
//! | oracle machine replies disagree | INFO |
//! | some nodes offline, quorum still connected | INFO |

use monitor_config::DetectorThresholds;
use types::{Anomaly, AnomalyKind, ConsensusView, HealthReport, Severity};

const CRITICAL_PENALTY: i32 = 30;
const WARNING_PENALTY: i32 = 10;
const INFO_PENALTY: i32 = 2;
const NODE_COUNT_BONUS: i32 = 5;

pub fn detect(view: &ConsensusView, thresholds: &DetectorThresholds) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if view.nodes_connected < thresholds.min_connected_nodes {
        anomalies.push(Anomaly::new(
            Severity::Critical,
            AnomalyKind::LowConnectivity,
            format!(
                "Only {} of {} nodes connected",
                view.nodes_connected, view.nodes_total
            ),
        ));
    }

    if view.stats.is_some() && view.success_rate < thresholds.critical_success_rate {
        anomalies.push(Anomaly::new(
            Severity::Critical,
            AnomalyKind::LowSuccessRate,
            format!("Oracle success rate {:.2}%", view.success_rate),
        ));
    }

    if view.tick_drift >= thresholds.max_tick_drift {
        anomalies.push(Anomaly::new(
            Severity::Warning,
            AnomalyKind::TickDrift,
            format!("Nodes disagree on tick by {} ticks", view.tick_drift),
        ));
    }

    if view.pending_count > thresholds.max_pending {
        anomalies.push(Anomaly::new(
            Severity::Warning,
            AnomalyKind::PendingBacklog,
            format!("{} oracle queries pending", view.pending_count),
        ));
    }

    if !view.stats_disagreements.is_empty() {
        let metrics: Vec<&str> = view
            .stats_disagreements
            .iter()
            .map(|d| d.metric.as_str())
            .collect();
        anomalies.push(Anomaly::new(
            Severity::Warning,
            AnomalyKind::StatsDisagreement,
            format!("Nodes report different values for {}", metrics.join(", ")),
        ));
    }

    if let Some(stats) = &view.stats {
        if view.success_rate >= thresholds.critical_success_rate
            && view.success_rate < thresholds.healthy_success_rate
        {
            anomalies.push(Anomaly::new(
                Severity::Info,
                AnomalyKind::ModerateSuccessRate,
                format!("Oracle success rate {:.2}%", view.success_rate),
            ));
        }

        if stats.wrong_knowledge_proof_count > 0 {
            anomalies.push(Anomaly::new(
                Severity::Info,
                AnomalyKind::WrongKnowledgeProof,
                format!(
                    "{} wrong knowledge proofs",
                    stats.wrong_knowledge_proof_count
                ),
            ));
        }

        if stats.oracle_machine_replies_disagree_count > 0 {
            anomalies.push(Anomaly::new(
                Severity::Info,
                AnomalyKind::OmDisagreement,
                format!(
                    "{} queries with disagreeing oracle machine replies",
                    stats.oracle_machine_replies_disagree_count
                ),
            ));
        }
    }

    if view.nodes_offline > 0 && view.nodes_connected >= thresholds.min_connected_nodes {
        anomalies.push(Anomaly::new(
            Severity::Info,
            AnomalyKind::PartialConnectivity,
            format!("{} of {} nodes offline", view.nodes_offline, view.nodes_total),
        ));
    }

    anomalies
}

/// 0-100 score: penalties per anomaly, a small bonus for wide coverage
pub fn health_score(
    anomalies: &[Anomaly],
    nodes_connected: usize,
    thresholds: &DetectorThresholds,
) -> u8 {
    let mut score: i32 = 100;
    for anomaly in anomalies {
        score -= match anomaly.severity {
            Severity::Critical => CRITICAL_PENALTY,
            Severity::Warning => WARNING_PENALTY,
            Severity::Info => INFO_PENALTY,
        };
    }
    if nodes_connected >= thresholds.bonus_min_nodes {
        score = (score + NODE_COUNT_BONUS).min(100);
    }
    score.clamp(0, 100) as u8
}

pub fn evaluate(view: &ConsensusView, thresholds: &DetectorThresholds) -> HealthReport {
    let anomalies = detect(view, thresholds);
    let health_score = health_score(&anomalies, view.nodes_connected, thresholds);
    HealthReport {
        anomalies,
        health_score,
    }
}
