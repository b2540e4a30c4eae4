//! Deployment replica audit across all namespaces.
//!
//! Compares the desired replica count of every deployment in the cluster
//! against what the control plane reports as available, and aggregates the
//! mismatches into a per-cycle verdict.

use std::time::Duration;

use k8s_openapi::api::apps::v1::Deployment;
use kube::{Client, ResourceExt};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::client::list_all_deployments;
use crate::error::Result;
use crate::status::StatusBoard;

/// Desired versus observed replica counts for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSnapshot {
    pub name: String,
    pub namespace: String,
    pub desired_replicas: i32,
    pub available_replicas: i32,
}

impl DeploymentSnapshot {
    /// Healthy only when available matches desired exactly. A deployment
    /// mid-rollout reports as unhealthy until it converges.
    pub fn is_healthy(&self) -> bool {
        self.available_replicas == self.desired_replicas
    }
}

/// Aggregate verdict over one audit cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterReplicaVerdict {
    pub all_healthy: bool,
    /// Mismatched deployments, in listing order.
    pub unhealthy: Vec<DeploymentSnapshot>,
}

/// Capture the replica counts of a deployment.
///
/// A missing count is coerced to zero on either side: a deployment that
/// reports no available replicas is never silently treated as healthy.
pub fn snapshot_of(deployment: &Deployment) -> DeploymentSnapshot {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(0);
    let available = deployment
        .status
        .as_ref()
        .and_then(|status| status.available_replicas)
        .unwrap_or(0);

    DeploymentSnapshot {
        name: deployment.name_any(),
        namespace: deployment.namespace().unwrap_or_default(),
        desired_replicas: desired,
        available_replicas: available,
    }
}

/// Partition snapshots into an aggregate verdict, preserving input order.
pub fn evaluate(snapshots: Vec<DeploymentSnapshot>) -> ClusterReplicaVerdict {
    let unhealthy: Vec<DeploymentSnapshot> = snapshots
        .into_iter()
        .filter(|snapshot| !snapshot.is_healthy())
        .collect();

    ClusterReplicaVerdict {
        all_healthy: unhealthy.is_empty(),
        unhealthy,
    }
}

/// Audit every deployment in the cluster once.
///
/// A cluster with no deployments is trivially healthy. If the listing call
/// itself fails the cycle aborts without a verdict; no partial results.
pub async fn audit_once(client: &Client) -> Result<ClusterReplicaVerdict> {
    let deployments = list_all_deployments(client).await?;
    let verdict = evaluate(deployments.iter().map(snapshot_of).collect());

    for snapshot in &verdict.unhealthy {
        warn!(
            deployment = %snapshot.name,
            namespace = %snapshot.namespace,
            desired = snapshot.desired_replicas,
            available = snapshot.available_replicas,
            "Deployment is not healthy"
        );
    }

    if verdict.all_healthy {
        info!("All deployments are healthy");
    } else {
        warn!(
            count = verdict.unhealthy.len(),
            "Some deployments are not healthy"
        );
    }

    Ok(verdict)
}

/// Audit the cluster on a fixed interval, forever.
///
/// A failed cycle is logged and dropped; the next tick starts fresh with no
/// memory of the failure. A cycle that overruns the interval delays the next
/// one; overrun ticks are neither skipped nor replayed in a burst.
pub async fn run_forever(client: Client, status: StatusBoard, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match audit_once(&client).await {
            Ok(verdict) => status.record_verdict(verdict).await,
            Err(e) => error!(error = %e, "Deployment replica audit failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn deployment(
        name: &str,
        namespace: &str,
        desired: Option<i32>,
        available: Option<i32>,
    ) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..ObjectMeta::default()
            },
            spec: Some(DeploymentSpec {
                replicas: desired,
                ..DeploymentSpec::default()
            }),
            status: available.map(|count| DeploymentStatus {
                available_replicas: Some(count),
                ..DeploymentStatus::default()
            }),
        }
    }

    fn snapshot(name: &str, namespace: &str, desired: i32, available: i32) -> DeploymentSnapshot {
        DeploymentSnapshot {
            name: name.to_string(),
            namespace: namespace.to_string(),
            desired_replicas: desired,
            available_replicas: available,
        }
    }

    #[test]
    fn test_snapshot_reads_counts_from_spec_and_status() {
        let snap = snapshot_of(&deployment("web", "default", Some(3), Some(3)));
        assert_eq!(snap, snapshot("web", "default", 3, 3));
        assert!(snap.is_healthy());
    }

    #[test]
    fn test_snapshot_missing_available_is_zero() {
        let snap = snapshot_of(&deployment("api", "default", Some(2), None));
        assert_eq!(snap.available_replicas, 0);
        assert!(!snap.is_healthy());
    }

    #[test]
    fn test_snapshot_missing_desired_is_zero() {
        let snap = snapshot_of(&deployment("idle", "default", None, None));
        assert_eq!(snap.desired_replicas, 0);
        assert_eq!(snap.available_replicas, 0);
        assert!(snap.is_healthy());
    }

    #[test]
    fn test_evaluate_partitions_by_exact_equality() {
        let verdict = evaluate(vec![
            snapshot("web", "default", 3, 3),
            snapshot("api", "default", 2, 1),
        ]);

        assert!(!verdict.all_healthy);
        assert_eq!(verdict.unhealthy, vec![snapshot("api", "default", 2, 1)]);
    }

    #[test]
    fn test_evaluate_empty_listing_is_healthy() {
        let verdict = evaluate(Vec::new());
        assert!(verdict.all_healthy);
        assert!(verdict.unhealthy.is_empty());
    }

    #[test]
    fn test_evaluate_overprovisioned_is_unhealthy() {
        // Exact equality, not a lower bound: surplus replicas also mismatch.
        let verdict = evaluate(vec![snapshot("web", "default", 2, 3)]);
        assert!(!verdict.all_healthy);
        assert_eq!(verdict.unhealthy.len(), 1);
    }

    #[test]
    fn test_evaluate_preserves_listing_order() {
        let verdict = evaluate(vec![
            snapshot("c", "ns3", 1, 0),
            snapshot("a", "ns1", 2, 0),
            snapshot("b", "ns2", 3, 3),
        ]);

        let names: Vec<&str> = verdict
            .unhealthy
            .iter()
            .map(|snap| snap.name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_evaluate_is_deterministic_for_same_input() {
        let snapshots = vec![
            snapshot("web", "default", 3, 3),
            snapshot("api", "default", 2, 1),
        ];

        let first = evaluate(snapshots.clone());
        let second = evaluate(snapshots);
        assert_eq!(first, second);
    }
}
