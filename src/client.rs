//! Control plane client construction and the read operations the probes use.

use std::path::Path;

use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::error::Result;

/// Build an authenticated Kubernetes client.
///
/// With an explicit kubeconfig path the file is loaded and used as-is.
/// Without one the client falls back to ambient configuration: the in-cluster
/// service account, or the local kubeconfig when running outside a cluster.
pub async fn build_client(kubeconfig: Option<&Path>) -> Result<Client> {
    match kubeconfig {
        Some(path) => {
            debug!(path = %path.display(), "Loading explicit kubeconfig");
            let kubeconfig = Kubeconfig::read_from(path)?;
            let config =
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
            Ok(Client::try_from(config)?)
        }
        None => Ok(Client::try_default().await?),
    }
}

/// Fetch the API server version string.
pub async fn fetch_version(client: &Client) -> Result<String> {
    let info = client.apiserver_version().await?;
    Ok(info.git_version)
}

/// List deployments across all namespaces in a single call.
pub async fn list_all_deployments(client: &Client) -> Result<Vec<Deployment>> {
    let deployments: Api<Deployment> = Api::all(client.clone());
    let list = deployments.list(&ListParams::default()).await?;
    Ok(list.items)
}
