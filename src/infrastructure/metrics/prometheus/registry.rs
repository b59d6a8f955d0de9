//! Ordered, name-unique metric registry.
//!
//! Metrics are registered once at startup and kept in registration order
//! so that the exposition output is deterministic. Every collector is also
//! registered in a `prometheus::Registry`, which enforces uniqueness the
//! same way any other Prometheus client would. That registry sorts its
//! families by name when gathered, so rendering walks the ordered list
//! instead.

use super::counters::{new_counter, new_gauge, new_histogram};
use super::exposition;
use parking_lot::RwLock;
use prometheus::core::{Collector, Metric};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Histogram, IntCounter};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building the registry.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("metric `{0}` is already registered")]
    DuplicateName(String),

    #[error("invalid histogram buckets: {0}")]
    InvalidBuckets(String),

    #[error("invalid metric: {0}")]
    InvalidMetric(String),
}

/// Exposition type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Point-in-time copy of a histogram's state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` in ascending bound order.
    pub buckets: Vec<(f64, u64)>,
    pub inf_count: u64,
    pub sum: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Counter(u64),
    Gauge(f64),
    Histogram(HistogramSnapshot),
}

impl MetricValue {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Counter(_) => MetricKind::Counter,
            MetricValue::Gauge(_) => MetricKind::Gauge,
            MetricValue::Histogram(_) => MetricKind::Histogram,
        }
    }
}

/// Point-in-time copy of one registered metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub name: String,
    pub help: String,
    pub value: MetricValue,
}

#[derive(Clone)]
enum MetricHandle {
    Counter(IntCounter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl MetricHandle {
    fn collector(&self) -> Box<dyn Collector> {
        match self {
            MetricHandle::Counter(c) => Box::new(c.clone()),
            MetricHandle::Gauge(g) => Box::new(g.clone()),
            MetricHandle::Histogram(h) => Box::new(h.clone()),
        }
    }

    fn families(&self) -> Vec<MetricFamily> {
        match self {
            MetricHandle::Counter(c) => c.collect(),
            MetricHandle::Gauge(g) => g.collect(),
            MetricHandle::Histogram(h) => h.collect(),
        }
    }
}

struct Entry {
    name: String,
    help: String,
    handle: MetricHandle,
}

impl Entry {
    fn snapshot(&self) -> MetricSnapshot {
        // ---
        let value = match &self.handle {
            MetricHandle::Counter(c) => MetricValue::Counter(c.get()),
            MetricHandle::Gauge(g) => MetricValue::Gauge(g.get()),
            MetricHandle::Histogram(h) => {
                // One proto read so buckets, sum and count agree.
                let proto = h.metric();
                let hist = proto.get_histogram();
                MetricValue::Histogram(HistogramSnapshot {
                    buckets: hist
                        .get_bucket()
                        .iter()
                        .map(|b| (b.get_upper_bound(), b.get_cumulative_count()))
                        .collect(),
                    inf_count: hist.get_sample_count(),
                    sum: hist.get_sample_sum(),
                    count: hist.get_sample_count(),
                })
            }
        };

        MetricSnapshot {
            name: self.name.clone(),
            help: self.help.clone(),
            value,
        }
    }
}

/// Registry of named metrics.
///
/// Built once per process and shared by handle. Tests construct their own
/// registries side by side.
#[derive(Default)]
pub struct Registry {
    inner: prometheus::Registry,
    entries: RwLock<Vec<Arc<Entry>>>,
}

impl Registry {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_counter(&self, name: &str, help: &str) -> Result<IntCounter, RegistryError> {
        // ---
        let counter = new_counter(name, help)?;
        self.register(name, help, MetricHandle::Counter(counter.clone()))?;
        Ok(counter)
    }

    pub fn register_gauge(&self, name: &str, help: &str) -> Result<Gauge, RegistryError> {
        // ---
        let gauge = new_gauge(name, help)?;
        self.register(name, help, MetricHandle::Gauge(gauge.clone()))?;
        Ok(gauge)
    }

    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        bounds: Vec<f64>,
    ) -> Result<Histogram, RegistryError> {
        // ---
        let histogram = new_histogram(name, help, bounds)?;
        self.register(name, help, MetricHandle::Histogram(histogram.clone()))?;
        Ok(histogram)
    }

    fn register(&self, name: &str, help: &str, handle: MetricHandle) -> Result<(), RegistryError> {
        // ---
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.name == name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        self.inner
            .register(handle.collector())
            .map_err(|err| match err {
                prometheus::Error::AlreadyReg => RegistryError::DuplicateName(name.to_string()),
                other => RegistryError::InvalidMetric(other.to_string()),
            })?;

        entries.push(Arc::new(Entry {
            name: name.to_string(),
            help: help.to_string(),
            handle,
        }));
        tracing::debug!(metric = name, "registered metric");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the metrics in registration order.
    ///
    /// The lock is held only long enough to copy the entry handles; each
    /// snapshot is read lazily as the iterator advances. Calling `collect`
    /// again starts a fresh pass over current values.
    pub fn collect(&self) -> impl Iterator<Item = MetricSnapshot> {
        // ---
        let entries: Vec<Arc<Entry>> = self.entries.read().clone();
        entries.into_iter().map(|e| e.snapshot())
    }

    /// Snapshot of a single metric by name.
    pub fn snapshot(&self, name: &str) -> Option<MetricSnapshot> {
        self.collect().find(|m| m.name == name)
    }

    /// Metric families in registration order.
    pub fn gather(&self) -> Vec<MetricFamily> {
        // ---
        let entries: Vec<Arc<Entry>> = self.entries.read().clone();
        entries.iter().flat_map(|e| e.handle.families()).collect()
    }

    /// Serializes every metric in the Prometheus text exposition format.
    pub fn render_exposition(&self) -> String {
        exposition::render(&self.gather())
    }
}
