// src/infrastructure/metrics/noop/mod.rs
mod noop_metrics;

pub use noop_metrics::NoopMetrics;
use std::sync::Arc;

/// Creates a new no-op metrics implementation.
///
/// This implementation does nothing - all metrics calls are ignored and
/// `/metrics` answers with an empty body.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Metrics disabled, using no-op backend");
    Ok(Arc::new(NoopMetrics::new()))
}
