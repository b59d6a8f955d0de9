//! Lifecycle of one monitored request/response exchange.
//!
//! An [`InFlightRequest`] is created when a monitored request arrives and
//! reports to the metrics backend exactly twice: once on creation and once
//! when it leaves the `Started` state. Leaving `Started` happens through an
//! explicit [`InFlightRequest::complete`], an explicit
//! [`InFlightRequest::abort`], or implicitly on drop, whichever comes first.

use super::metrics::{ExchangeOutcome, MetricsPtr};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Started,
    Completed,
    Aborted,
}

/// Guard owning the start instant of a monitored exchange.
pub struct InFlightRequest {
    metrics: MetricsPtr,
    started_at: Instant,
    state: ExchangeState,
    status: Option<u16>,
}

impl InFlightRequest {
    /// Marks the exchange as started and bumps the concurrency gauge.
    pub fn start(metrics: MetricsPtr) -> Self {
        // ---
        metrics.request_started();
        Self {
            metrics,
            started_at: Instant::now(),
            state: ExchangeState::Started,
            status: None,
        }
    }

    /// Records the status of the response being delivered.
    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Transitions `Started -> Completed`. Returns `false` if the exchange
    /// had already finished.
    pub fn complete(&mut self) -> bool {
        self.finish(ExchangeState::Completed)
    }

    /// Transitions `Started -> Aborted`. Returns `false` if the exchange
    /// had already finished.
    pub fn abort(&mut self) -> bool {
        self.finish(ExchangeState::Aborted)
    }

    fn finish(&mut self, next: ExchangeState) -> bool {
        // ---
        if self.state != ExchangeState::Started {
            return false;
        }

        let elapsed = self.started_at.elapsed();
        let outcome = match (next, self.status) {
            (ExchangeState::Completed, Some(status)) => ExchangeOutcome::Completed { status },
            (_, status) => ExchangeOutcome::Aborted { status },
        };
        self.state = match outcome {
            ExchangeOutcome::Completed { .. } => ExchangeState::Completed,
            ExchangeOutcome::Aborted { .. } => ExchangeState::Aborted,
        };

        if let ExchangeOutcome::Aborted { status } = outcome {
            tracing::warn!(?status, ?elapsed, "monitored exchange aborted before delivery");
        }
        self.metrics.request_finished(elapsed, outcome);
        true
    }
}

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        self.abort();
    }
}
