//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers and middleware via the `State` extractor. It is built
//! once at startup and cloned cheaply per request (`Arc` inside).

use crate::domain::MetricsPtr;
use std::collections::HashSet;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// # Lifecycle
///
/// 1. Created once in `build_router()` during application startup
/// 2. Attached to the Axum router and the metrics middleware
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Metrics implementation for recording page requests.
    ///
    /// Either Prometheus-backed (production) or no-op.
    metrics: MetricsPtr,

    /// Paths whose requests are measured, matched exactly.
    monitored_paths: Arc<HashSet<String>>,
}

impl AppState {
    // ---

    pub fn new(metrics: MetricsPtr, monitored_paths: impl IntoIterator<Item = String>) -> Self {
        // ---
        AppState {
            metrics,
            monitored_paths: Arc::new(monitored_paths.into_iter().collect()),
        }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Whether requests to `path` are instrumented.
    pub(crate) fn is_monitored(&self, path: &str) -> bool {
        // ---
        self.monitored_paths.contains(path)
    }
}
