mod counters;
mod exposition;
mod prometheus_metrics;
mod registry;

pub use exposition::{format_value, CONTENT_TYPE};
pub use prometheus_metrics::{
    PrometheusMetrics, CONCURRENT_METRIC, ERROR_METRIC, LATENCY_BUCKETS, LATENCY_METRIC,
    OVER_2S_METRIC, SUCCESS_METRIC,
};
pub use registry::{
    HistogramSnapshot, MetricKind, MetricSnapshot, MetricValue, Registry, RegistryError,
};
use std::sync::Arc;

/// Creates a new Prometheus metrics implementation.
///
/// The page metrics are registered into `registry`, which the caller keeps
/// for the lifetime of the process.
///
/// Returns a fully initialized metrics instance ready for use.
pub fn create(registry: Arc<Registry>) -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    Ok(Arc::new(PrometheusMetrics::new(registry)?))
}
