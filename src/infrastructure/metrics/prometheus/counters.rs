//! Construction of the individual metric collectors.
//!
//! Values live in the `prometheus` crate's atomic collectors. This module
//! only builds them and turns the crate's errors into [`RegistryError`].

use super::registry::RegistryError;
use prometheus::{Gauge, Histogram, HistogramOpts, IntCounter};

pub fn new_counter(name: &str, help: &str) -> Result<IntCounter, RegistryError> {
    IntCounter::new(name, help).map_err(|err| RegistryError::InvalidMetric(err.to_string()))
}

pub fn new_gauge(name: &str, help: &str) -> Result<Gauge, RegistryError> {
    Gauge::new(name, help).map_err(|err| RegistryError::InvalidMetric(err.to_string()))
}

/// Builds a histogram over `bounds`.
///
/// # Errors
/// Returns [`RegistryError::InvalidBuckets`] when the bounds are empty,
/// not strictly ascending, or contain a non-finite value. The `prometheus`
/// crate would silently swap an empty list for its defaults and drop a
/// trailing `+Inf`, so both are rejected here first.
pub fn new_histogram(name: &str, help: &str, bounds: Vec<f64>) -> Result<Histogram, RegistryError> {
    // ---
    validate_bounds(&bounds)?;

    let opts = HistogramOpts::new(name, help).buckets(bounds);
    Histogram::with_opts(opts).map_err(|err| RegistryError::InvalidMetric(err.to_string()))
}

fn validate_bounds(bounds: &[f64]) -> Result<(), RegistryError> {
    // ---
    if bounds.is_empty() {
        return Err(RegistryError::InvalidBuckets("no bucket bounds given".into()));
    }
    if let Some(bad) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(RegistryError::InvalidBuckets(format!(
            "bucket bound {bad} is not finite"
        )));
    }
    if let Some(pair) = bounds.windows(2).find(|w| w[0] >= w[1]) {
        return Err(RegistryError::InvalidBuckets(format!(
            "bucket bounds must be strictly ascending, found {} before {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}
