//! Aggregated results of a load run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Pass/fail tally of one named check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passed: u64,
    pub failed: u64,
}

impl CheckSummary {
    /// Fraction of passed checks, `0.0` when nothing ran.
    pub fn pass_rate(&self) -> f64 {
        let total = self.passed + self.failed;
        if total == 0 {
            0.0
        } else {
            self.passed as f64 / total as f64
        }
    }
}

/// Latency distribution of the requests that got a response, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub med_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub max_ms: f64,
}

impl LatencySummary {
    /// Summarizes `samples`; `None` when there are none.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        // ---
        if samples.is_empty() {
            return None;
        }
        let mut ms: Vec<f64> = samples.iter().map(|d| d.as_nanos() as f64 / 1e6).collect();
        ms.sort_by(f64::total_cmp);

        Some(Self {
            min_ms: ms[0],
            avg_ms: ms.iter().sum::<f64>() / ms.len() as f64,
            med_ms: percentile(&ms, 50.0),
            p90_ms: percentile(&ms, 90.0),
            p95_ms: percentile(&ms, 95.0),
            max_ms: ms[ms.len() - 1],
        })
    }
}

/// Linear interpolation between closest ranks over sorted input.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    // ---
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Final report of a load run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub target_url: String,
    pub vus: u32,
    pub requests: u64,
    pub transport_errors: u64,
    pub checks: Vec<CheckSummary>,
    pub latency: Option<LatencySummary>,
}

impl LoadReport {
    /// Whether every check of every request passed.
    pub fn all_checks_passed(&self) -> bool {
        self.checks.iter().all(|c| c.failed == 0)
    }

    pub fn check(&self, name: &str) -> Option<&CheckSummary> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        writeln!(f, "target ........: {}", self.target_url)?;
        writeln!(f, "started .......: {}", self.started_at.to_rfc3339())?;
        writeln!(
            f,
            "vus ...........: {} for {:.1}s",
            self.vus, self.elapsed_secs
        )?;
        writeln!(f)?;

        for check in &self.checks {
            let mark = if check.failed == 0 { '✓' } else { '✗' };
            writeln!(
                f,
                "  {mark} {:<28} {:>6.2}%  ✓ {}  ✗ {}",
                check.name,
                check.pass_rate() * 100.0,
                check.passed,
                check.failed
            )?;
        }
        writeln!(f)?;

        let rate = if self.elapsed_secs > 0.0 {
            self.requests as f64 / self.elapsed_secs
        } else {
            0.0
        };
        writeln!(f, "requests ......: {} ({rate:.2}/s)", self.requests)?;
        writeln!(f, "transport errs : {}", self.transport_errors)?;

        match &self.latency {
            Some(l) => writeln!(
                f,
                "req duration ..: min={:.2}ms avg={:.2}ms med={:.2}ms p(90)={:.2}ms p(95)={:.2}ms max={:.2}ms",
                l.min_ms, l.avg_ms, l.med_ms, l.p90_ms, l.p95_ms, l.max_ms
            ),
            None => writeln!(f, "req duration ..: no responses"),
        }
    }
}
