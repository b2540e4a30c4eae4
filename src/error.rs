//! Error types for the cluster monitor.

use thiserror::Error;

/// Errors that can occur when talking to the control plane.
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API request failed
    #[error("Kubernetes API request failed: {0}")]
    Kube(#[from] kube::Error),

    /// Kubeconfig could not be loaded or parsed
    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, Error>;
