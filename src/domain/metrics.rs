use std::sync::Arc;
use std::time::Duration;

/// Requests slower than this are counted as "over 2 seconds".
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(2);

/// How a monitored exchange left the `Started` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The response was delivered in full with this status.
    Completed { status: u16 },

    /// The exchange ended before delivery finished. `status` is set when
    /// a response had already been produced.
    Aborted { status: Option<u16> },
}

impl ExchangeOutcome {
    /// Only a fully delivered `200 OK` counts as success.
    pub fn is_success(&self) -> bool {
        matches!(self, ExchangeOutcome::Completed { status: 200 })
    }
}

/// Abstraction for the page request metrics.
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// A monitored request has entered the server.
    fn request_started(&self);

    /// A monitored request has left the server, exactly once per
    /// `request_started`.
    fn request_finished(&self, elapsed: Duration, outcome: ExchangeOutcome);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
