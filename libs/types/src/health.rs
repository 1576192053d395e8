//! Anomaly and health scoring output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Anomaly severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Detector rule that produced an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    LowConnectivity,
    LowSuccessRate,
    TickDrift,
    PendingBacklog,
    StatsDisagreement,
    ModerateSuccessRate,
    WrongKnowledgeProof,
    OmDisagreement,
    PartialConnectivity,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::LowConnectivity => "low_connectivity",
            AnomalyKind::LowSuccessRate => "low_success_rate",
            AnomalyKind::TickDrift => "tick_drift",
            AnomalyKind::PendingBacklog => "pending_backlog",
            AnomalyKind::StatsDisagreement => "stats_disagreement",
            AnomalyKind::ModerateSuccessRate => "moderate_success_rate",
            AnomalyKind::WrongKnowledgeProof => "wrong_knowledge_proof",
            AnomalyKind::OmDisagreement => "om_disagreement",
            AnomalyKind::PartialConnectivity => "partial_connectivity",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub message: String,
}

impl Anomaly {
    pub fn new(severity: Severity, kind: AnomalyKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}

/// Detector output for one consensus view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub anomalies: Vec<Anomaly>,
    pub health_score: u8,
}

impl HealthReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == severity)
            .count()
    }

    pub fn has(&self, kind: AnomalyKind) -> bool {
        self.anomalies.iter().any(|a| a.kind == kind)
    }
}
