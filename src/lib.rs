// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::handlers::{health_check, index_service, metrics_handler, static_dir_service};
use crate::middleware::track_page_requests;

// Public exports (visible outside this module)
pub mod domain;
pub mod loadgen;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod middleware;

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_metrics, // ---
    create_prom_metrics,
};

// Registry types are public so scrapers and tests can read values back
pub use infrastructure::metrics::prometheus;

use domain::MetricsPtr;
use crate::infrastructure::metrics::prometheus::Registry;

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing() {
    // ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

/// Build the metrics backend selected by configuration.
///
/// The Prometheus backend gets a fresh [`Registry`] that lives as long as
/// the returned handle.
pub fn create_metrics(config: &MetricsConfig) -> Result<MetricsPtr> {
    // ---
    match config.backend {
        MetricsBackend::Prometheus => create_prom_metrics(Arc::new(Registry::new())),
        MetricsBackend::Noop => create_noop_metrics(),
    }
}

/// Build the HTTP router with configuration and metrics read from the environment.
pub fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;
    let metrics = create_metrics(&config.metrics)?;

    init_tracing();

    Ok(build_router(&config, metrics))
}

/// Build the HTTP router around an existing metrics backend.
///
/// Routes:
/// - `GET /metrics` - exposition text
/// - `GET /health`  - liveness
/// - `GET /`        - the default document
/// - anything else  - a file under the static root, or 404
///
/// The request metrics layer wraps every route, including the static
/// fallback, and decides per request whether the path is monitored.
pub fn build_router(config: &AppConfig, metrics: MetricsPtr) -> Router {
    // ---
    let app_state = AppState::new(metrics, config.metrics.monitored_paths.iter().cloned());

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .route_service("/", index_service(&config.server))
        .fallback_service(static_dir_service(&config.server))
        .layer(from_fn_with_state(app_state.clone(), track_page_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
