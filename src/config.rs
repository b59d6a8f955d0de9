// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the page
//! server. Every setting has a default, so an empty environment yields a
//! server on port 5000 serving `./public`. Values that are present but
//! malformed are treated as deployment errors rather than silently
//! replaced.

use anyhow::Result;
use std::path::PathBuf;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional string environment variable, falling back to a
/// default when unset or blank.
macro_rules! optional_env {
    // ---
    ($key:literal, $default:expr) => {
        std::env::var($key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| $default.to_string())
    };
}

/// Builds the error returned for a present-but-unusable variable.
macro_rules! invalid_env {
    // ---
    ($key:literal, $($arg:tt)+) => {
        anyhow::anyhow!(
            "Invalid configuration: {}: {}",
            $key,
            format!($($arg)+)
        )
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails because of an invalid
/// environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub metrics: metrics::MetricsConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any present value is invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            metrics: metrics::MetricsConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Listener and static content settings.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Interface to bind. Defaults to `0.0.0.0`.
        pub bind_host: String,

        /// TCP port to listen on. Defaults to 5000.
        pub port: u16,

        /// Root directory for static files. Defaults to `public`.
        pub static_dir: PathBuf,

        /// Document served for `/`, relative to `static_dir`. Defaults to `index.html`.
        pub index_file: String,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `PAGE_INDEX_FILE` is not a plain relative
        /// file name inside the static root.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_host = optional_env!("PAGE_BIND_HOST", "0.0.0.0");
            let port = optional_env_parse!("PAGE_PORT", u16, 5000);
            let static_dir = PathBuf::from(optional_env!("PAGE_STATIC_DIR", "public"));
            let index_file = optional_env!("PAGE_INDEX_FILE", "index.html");

            if index_file.starts_with('/') || index_file.split('/').any(|part| part == "..") {
                return Err(invalid_env!(
                    "PAGE_INDEX_FILE",
                    "`{index_file}` must be relative to the static directory"
                ));
            }

            Ok(Self {
                bind_host,
                port,
                static_dir,
                index_file,
            })
        }

        /// `host:port` string handed to the TCP listener.
        pub fn bind_addr(&self) -> String {
            format!("{}:{}", self.bind_host, self.port)
        }

        /// Full path of the default document.
        pub fn index_path(&self) -> PathBuf {
            self.static_dir.join(&self.index_file)
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---
    use super::*;

    /// Which metrics backend records page requests.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsBackend {
        Prometheus,
        Noop,
    }

    /// Request instrumentation settings.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Backend selected by `PAGE_METRICS_TYPE` (`prom` or `noop`). Defaults to `prom`.
        pub backend: MetricsBackend,

        /// Exact request paths that are measured. Defaults to `/` and `/index.html`.
        pub monitored_paths: Vec<String>,
    }

    impl MetricsConfig {
        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error for an unknown backend name or a monitored
        /// path list that is empty or contains a path without a leading `/`.
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = match optional_env!("PAGE_METRICS_TYPE", "prom").as_str() {
                "prom" => MetricsBackend::Prometheus,
                "noop" => MetricsBackend::Noop,
                other => {
                    return Err(invalid_env!(
                        "PAGE_METRICS_TYPE",
                        "expected `prom` or `noop`, got `{other}`"
                    ))
                }
            };

            let monitored_paths: Vec<String> =
                optional_env!("PAGE_MONITORED_PATHS", "/,/index.html")
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();

            if monitored_paths.is_empty() {
                return Err(invalid_env!("PAGE_MONITORED_PATHS", "no paths listed"));
            }
            if let Some(bad) = monitored_paths.iter().find(|p| !p.starts_with('/')) {
                return Err(invalid_env!(
                    "PAGE_MONITORED_PATHS",
                    "`{bad}` does not start with `/`"
                ));
            }

            Ok(Self {
                backend,
                monitored_paths,
            })
        }
    }

    impl Default for MetricsConfig {
        fn default() -> Self {
            Self {
                backend: MetricsBackend::Prometheus,
                monitored_paths: vec!["/".to_string(), "/index.html".to_string()],
            }
        }
    }
}
pub use metrics::{MetricsBackend, MetricsConfig};

// ============================================================
// Tests
// ============================================================
