use crate::domain::{ExchangeOutcome, Metrics};
use std::time::Duration;

/// No-op metrics implementation for when instrumentation is switched off.
#[derive(Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn request_started(&self) {}
    fn request_finished(&self, _: Duration, _: ExchangeOutcome) {}
}
