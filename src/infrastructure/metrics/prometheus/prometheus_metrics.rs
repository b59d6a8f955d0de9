//! Prometheus metrics implementation.
//!
//! This module provides the concrete implementation of the `Metrics` trait
//! for the front page. It registers the five page metrics in a
//! [`Registry`] owned by the instance and classifies every finished
//! exchange into them.
//!
//! Metric names and help strings match the series already scraped from
//! the deployed page server, so they must not change.

use super::registry::{Registry, RegistryError};
use crate::domain::{ExchangeOutcome, Metrics, SLOW_REQUEST_THRESHOLD};
use prometheus::{Gauge, Histogram, IntCounter};
use std::sync::Arc;
use std::time::Duration;

pub const LATENCY_METRIC: &str = "request_latency_seconds";
pub const SUCCESS_METRIC: &str = "request_success_total";
pub const ERROR_METRIC: &str = "request_error_total";
pub const OVER_2S_METRIC: &str = "request_over_2_seconds_total";
pub const CONCURRENT_METRIC: &str = "request_concurrent_total";

/// Upper bounds, in seconds, of the latency histogram.
pub const LATENCY_BUCKETS: [f64; 10] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0];

/// Prometheus-backed page metrics.
pub struct PrometheusMetrics {
    registry: Arc<Registry>,
    latency: Histogram,
    success: IntCounter,
    error: IntCounter,
    over_2s: IntCounter,
    concurrent: Gauge,
}

impl PrometheusMetrics {
    /// Registers the page metrics into `registry`.
    ///
    /// # Errors
    /// Fails with [`RegistryError::DuplicateName`] if any of the page
    /// metric names is already taken in `registry`.
    pub fn new(registry: Arc<Registry>) -> Result<Self, RegistryError> {
        // ---
        tracing::info!("Creating Prometheus metrics");

        let latency = registry.register_histogram(
            LATENCY_METRIC,
            "Latência das requisições para /index.html",
            LATENCY_BUCKETS.to_vec(),
        )?;
        let success =
            registry.register_counter(SUCCESS_METRIC, "Quantidade de requisições com sucesso")?;
        let error =
            registry.register_counter(ERROR_METRIC, "Quantidade de requisições com erro")?;
        let over_2s = registry.register_counter(
            OVER_2S_METRIC,
            "Quantidade de requisições que excederam 2 segundos",
        )?;
        let concurrent = registry.register_gauge(
            CONCURRENT_METRIC,
            "Número de requisições concorrentes em andamento",
        )?;

        Ok(Self {
            registry,
            latency,
            success,
            error,
            over_2s,
            concurrent,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Current number of monitored requests in flight.
    pub fn in_flight(&self) -> f64 {
        self.concurrent.get()
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        self.registry.render_exposition()
    }

    fn request_started(&self) {
        self.concurrent.inc();
    }

    fn request_finished(&self, elapsed: Duration, outcome: ExchangeOutcome) {
        // ---
        tracing::debug!(?elapsed, ?outcome, "Recording page request");

        self.latency.observe(elapsed.as_secs_f64());
        if elapsed > SLOW_REQUEST_THRESHOLD {
            self.over_2s.inc();
        }
        if outcome.is_success() {
            self.success.inc();
        } else {
            self.error.inc();
        }
        self.concurrent.dec();
    }
}
