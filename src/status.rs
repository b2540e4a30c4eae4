//! Latest-result status board shared by the probe loops and the HTTP layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::probes::api_server::ProbeResult;
use crate::probes::replicas::ClusterReplicaVerdict;

/// Last API server probe outcome with its observation time.
#[derive(Debug, Clone, Serialize)]
pub struct ApiServerStatus {
    #[serde(flatten)]
    pub outcome: ProbeResult,
    pub checked_at: DateTime<Utc>,
}

/// Last replica audit verdict with its observation time.
#[derive(Debug, Clone, Serialize)]
pub struct ReplicaStatus {
    #[serde(flatten)]
    pub verdict: ClusterReplicaVerdict,
    pub checked_at: DateTime<Utc>,
}

/// Point-in-time view of the latest results from both probes.
///
/// Slots are `None` until the corresponding probe has completed its first
/// tick after startup.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub api_server: Option<ApiServerStatus>,
    pub replicas: Option<ReplicaStatus>,
}

#[derive(Debug, Default)]
struct Latest {
    api_server: Option<ApiServerStatus>,
    replicas: Option<ReplicaStatus>,
}

/// Shared sink for probe results.
///
/// Each probe overwrites only its own slot, so the loops never contend over
/// the same data; readers always see the most recently recorded results.
#[derive(Clone, Default)]
pub struct StatusBoard {
    latest: Arc<RwLock<Latest>>,
}

impl StatusBoard {
    /// Record the outcome of an API server probe tick.
    pub async fn record_probe(&self, outcome: ProbeResult) {
        let mut latest = self.latest.write().await;
        latest.api_server = Some(ApiServerStatus {
            outcome,
            checked_at: Utc::now(),
        });
    }

    /// Record the verdict of a replica audit cycle.
    pub async fn record_verdict(&self, verdict: ClusterReplicaVerdict) {
        let mut latest = self.latest.write().await;
        latest.replicas = Some(ReplicaStatus {
            verdict,
            checked_at: Utc::now(),
        });
    }

    /// Snapshot the latest recorded results.
    pub async fn report(&self) -> StatusReport {
        let latest = self.latest.read().await;
        StatusReport {
            api_server: latest.api_server.clone(),
            replicas: latest.replicas.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_report_is_empty_before_first_tick() {
        let board = StatusBoard::default();
        let report = board.report().await;
        assert!(report.api_server.is_none());
        assert!(report.replicas.is_none());
    }

    #[tokio::test]
    async fn test_latest_probe_result_wins() {
        let board = StatusBoard::default();

        board
            .record_probe(ProbeResult::Failed {
                cause: "connection refused".to_string(),
            })
            .await;
        board
            .record_probe(ProbeResult::Healthy {
                version: "v1.31.0".to_string(),
            })
            .await;

        let report = board.report().await;
        let api_server = report.api_server.expect("probe result recorded");
        assert_eq!(
            api_server.outcome,
            ProbeResult::Healthy {
                version: "v1.31.0".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let board = StatusBoard::default();

        board
            .record_verdict(ClusterReplicaVerdict {
                all_healthy: true,
                unhealthy: Vec::new(),
            })
            .await;

        let report = board.report().await;
        assert!(report.api_server.is_none());
        assert!(report.replicas.expect("verdict recorded").verdict.all_healthy);
    }
}
