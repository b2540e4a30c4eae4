//! Cluster health monitor service.
//!
//! Probes the Kubernetes API server and audits deployment replica health on
//! independent schedules, serving the latest results over HTTP.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel::client::{build_client, fetch_version};
use sentinel::probes::{api_server, replicas};
use sentinel::server::{build_router, AppState};
use sentinel::status::StatusBoard;

/// Cluster health monitor - probes API server liveness and deployment replica health
#[derive(Parser)]
#[command(name = "sentinel", version, about)]
struct Args {
    /// Path to kubeconfig, leave empty for in-cluster credentials
    #[arg(short, long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// HTTP server listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    address: String,

    /// API server probe interval in seconds
    #[arg(long, default_value = "5")]
    probe_interval: u64,

    /// Deployment replica audit interval in seconds
    #[arg(long, default_value = "60")]
    audit_interval: u64,

    /// Run a single replica audit, print the verdict, and exit non-zero if
    /// any deployment is unhealthy
    #[arg(long)]
    check_deployments: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // An empty path means the same thing as no path: use ambient credentials.
    let kubeconfig = args
        .kubeconfig
        .filter(|path| !path.as_os_str().is_empty());

    let client = build_client(kubeconfig.as_deref())
        .await
        .context("Failed to create Kubernetes client")?;

    // Fail fast if the control plane was never reachable; once this check
    // passes, later flakiness is the probes' problem, not a startup error.
    let version = fetch_version(&client)
        .await
        .context("Failed to reach the Kubernetes API server")?;
    info!(version = %version, "Connected to Kubernetes");

    if args.check_deployments {
        let verdict = replicas::audit_once(&client).await?;
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        if !verdict.all_healthy {
            std::process::exit(1);
        }
        return Ok(());
    }

    let status = StatusBoard::default();

    // Background probes share the client handle and are never joined; they
    // hold nothing that needs draining on shutdown.
    tokio::spawn(api_server::run_forever(
        client.clone(),
        status.clone(),
        Duration::from_secs(args.probe_interval),
    ));
    tokio::spawn(replicas::run_forever(
        client,
        status.clone(),
        Duration::from_secs(args.audit_interval),
    ));

    let app = build_router(AppState { status });

    let listener = TcpListener::bind(&args.address)
        .await
        .with_context(|| format!("Failed to bind to {}", args.address))?;
    info!(address = %args.address, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Monitor stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
