//! Virtual-user loop and run orchestration.
//!
//! Each virtual user owns its tally; nothing is shared between users while
//! the run is in progress. Tallies are merged once every user has stopped.

use super::config::LoadConfig;
use super::report::{CheckSummary, LatencySummary, LoadReport};
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

pub const STATUS_CHECK: &str = "status is 200";

/// Name of the latency check for a given threshold, e.g. `response time < 200ms`.
pub fn latency_check_name(threshold: Duration) -> String {
    format!("response time < {}", humantime::format_duration(threshold))
}

/// Outcome of one GET issued by a virtual user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// `None` when no response arrived (connect failure, timeout, reset).
    pub status: Option<u16>,
    pub latency: Duration,
}

/// Per-user accumulation of attempts.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tally {
    pub requests: u64,
    pub transport_errors: u64,
    pub status_passed: u64,
    pub status_failed: u64,
    pub latency_passed: u64,
    pub latency_failed: u64,
    /// Latencies of attempts that got a response.
    pub latencies: Vec<Duration>,
}

impl Tally {
    /// Scores an attempt against both checks.
    ///
    /// A transport error fails both checks: there is no status, and the
    /// time spent says nothing about the page's latency.
    pub fn record(&mut self, attempt: Attempt, threshold: Duration) {
        // ---
        self.requests += 1;

        let Some(status) = attempt.status else {
            self.transport_errors += 1;
            self.status_failed += 1;
            self.latency_failed += 1;
            return;
        };

        if status == StatusCode::OK.as_u16() {
            self.status_passed += 1;
        } else {
            self.status_failed += 1;
        }
        if attempt.latency < threshold {
            self.latency_passed += 1;
        } else {
            self.latency_failed += 1;
        }
        self.latencies.push(attempt.latency);
    }

    pub fn merge(&mut self, other: Tally) {
        // ---
        self.requests += other.requests;
        self.transport_errors += other.transport_errors;
        self.status_passed += other.status_passed;
        self.status_failed += other.status_failed;
        self.latency_passed += other.latency_passed;
        self.latency_failed += other.latency_failed;
        self.latencies.extend(other.latencies);
    }
}

/// Runs the configured scenario to completion and returns the report.
///
/// # Errors
/// Fails only if the HTTP client cannot be built or a virtual user task
/// panics. Failed checks never end the run.
pub async fn run(config: &LoadConfig) -> Result<LoadReport> {
    // ---
    let client = Client::builder()
        .timeout(config.timeout)
        .build()
        .context("failed to build HTTP client")?;

    info!(
        vus = config.vus,
        duration = %humantime::format_duration(config.duration),
        target = %config.target_url,
        "Starting load run"
    );

    let started_at = Utc::now();
    let start = Instant::now();
    let deadline = start + config.duration;

    let users = (0..config.vus).map(|id| {
        let user = VirtualUser {
            id,
            client: client.clone(),
            target: config.target_url.clone(),
            threshold: config.latency_threshold,
            sleep: config.sleep,
        };
        tokio::spawn(user.run(deadline))
    });

    let mut total = Tally::default();
    for joined in futures::future::join_all(users).await {
        total.merge(joined.context("virtual user task failed")?);
    }
    let elapsed = start.elapsed();

    info!(
        requests = total.requests,
        transport_errors = total.transport_errors,
        elapsed = ?elapsed,
        "Load run finished"
    );

    Ok(LoadReport {
        started_at,
        elapsed_secs: elapsed.as_secs_f64(),
        target_url: config.target_url.to_string(),
        vus: config.vus,
        requests: total.requests,
        transport_errors: total.transport_errors,
        checks: vec![
            CheckSummary {
                name: STATUS_CHECK.to_string(),
                passed: total.status_passed,
                failed: total.status_failed,
            },
            CheckSummary {
                name: latency_check_name(config.latency_threshold),
                passed: total.latency_passed,
                failed: total.latency_failed,
            },
        ],
        latency: LatencySummary::from_samples(&total.latencies),
    })
}

struct VirtualUser {
    id: u32,
    client: Client,
    target: Url,
    threshold: Duration,
    sleep: Duration,
}

impl VirtualUser {
    async fn run(self, deadline: Instant) -> Tally {
        // ---
        let mut tally = Tally::default();

        while Instant::now() < deadline {
            let attempt = self.attempt().await;
            debug!(vu = self.id, ?attempt, "request finished");
            tally.record(attempt, self.threshold);

            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            tokio::time::sleep(self.sleep.min(left)).await;
        }

        tally
    }

    /// Issues one GET and reads the body, timing the whole exchange.
    async fn attempt(&self) -> Attempt {
        // ---
        let started = Instant::now();

        let status = match self.client.get(self.target.clone()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(_) => Some(status),
                    Err(err) => {
                        debug!(vu = self.id, %err, "response body failed");
                        None
                    }
                }
            }
            Err(err) => {
                debug!(vu = self.id, %err, "request failed");
                None
            }
        };

        Attempt {
            status,
            latency: started.elapsed(),
        }
    }
}
