mod exchange;
mod metrics;

// Publicly expose the Metrics abstraction
pub use metrics::{ExchangeOutcome, Metrics, MetricsPtr, SLOW_REQUEST_THRESHOLD};

// Publicly expose the per-exchange lifecycle
pub use exchange::{ExchangeState, InFlightRequest};
