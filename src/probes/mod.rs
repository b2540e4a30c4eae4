//! Periodic cluster probes.
//!
//! Each probe loops forever on its own fixed interval, shares nothing with
//! its sibling beyond the read-only client handle, and reports outward only
//! through logs and the status board.

pub mod api_server;
pub mod replicas;

pub use api_server::ProbeResult;
pub use replicas::{ClusterReplicaVerdict, DeploymentSnapshot};
