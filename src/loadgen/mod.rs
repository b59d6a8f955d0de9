//! Synthetic load driver.
//!
//! Runs a fixed number of virtual users against one URL for a fixed
//! duration. Every request is checked for a `200` status and for latency
//! under a threshold; failed checks are counted and never stop the run.

mod config;
mod report;
mod runner;

pub use config::LoadConfig;
pub use report::{CheckSummary, LatencySummary, LoadReport};
pub use runner::{latency_check_name, run, Attempt, Tally, STATUS_CHECK};
