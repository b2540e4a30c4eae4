//! HTTP surface exposing the latest monitor results.

use std::time::Duration;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::status::{StatusBoard, StatusReport};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Latest probe and audit results.
    pub status: StatusBoard,
}

/// Build the HTTP router for the monitor.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/status", get(cluster_status))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(Duration::from_secs(60))),
        )
        .with_state(state)
}

/// Liveness, folding in the last API server probe outcome.
///
/// Before the first tick completes the service reports healthy: startup
/// already verified connectivity once.
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let report = state.status.report().await;
    let healthy = report
        .api_server
        .as_ref()
        .map_or(true, |status| status.outcome.is_healthy());

    Json(json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "service": "sentinel",
        "version": env!("CARGO_PKG_VERSION"),
        "api_server": report.api_server,
    }))
}

async fn readiness_check() -> Json<Value> {
    Json(json!({
        "status": "ready",
        "service": "sentinel",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Full status payload: last probe outcome, last audit verdict, and
/// per-deployment unhealthy detail.
async fn cluster_status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.status.report().await)
}
