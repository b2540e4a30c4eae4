//! API server liveness probe.

use std::time::Duration;

use kube::Client;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::client::fetch_version;
use crate::status::StatusBoard;

/// Outcome of a single API server check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProbeResult {
    /// The API server answered; carries its reported version.
    Healthy { version: String },
    /// The check failed; carries the failure cause.
    Failed { cause: String },
}

impl ProbeResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeResult::Healthy { .. })
    }
}

/// Run one liveness check against the API server.
///
/// Failures are captured in the result rather than propagated, so a bad tick
/// can never take down the probe loop.
pub async fn probe_once(client: &Client) -> ProbeResult {
    match fetch_version(client).await {
        Ok(version) => {
            info!(version = %version, "Kubernetes API server is healthy");
            ProbeResult::Healthy { version }
        }
        Err(e) => {
            error!(error = %e, "Kubernetes API server health check failed");
            ProbeResult::Failed {
                cause: e.to_string(),
            }
        }
    }
}

/// Check the API server on a fixed interval, forever.
///
/// Every tick is an independent attempt: no retry, no backoff, no state
/// carried over besides the interval itself. A tick that overruns the
/// interval delays the next one; overrun ticks are neither skipped nor
/// replayed in a burst.
pub async fn run_forever(client: Client, status: StatusBoard, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let result = probe_once(&client).await;
        status.record_probe(result).await;
    }
}
