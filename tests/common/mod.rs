// Test helpers are intentionally partially used
#![allow(dead_code)]

use page_latency_monitor::domain::MetricsPtr;
use page_latency_monitor::prometheus::{
    HistogramSnapshot, MetricValue, PrometheusMetrics, Registry, CONCURRENT_METRIC,
    LATENCY_METRIC,
};
use page_latency_monitor::{
    build_router, create_noop_metrics, AppConfig, MetricsConfig, ServerConfig,
};
use reqwest::Client;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><h1>front page</h1></body></html>\n";
pub const STYLE_CSS: &str = "body { margin: 0; }\n";

// ============================================================================
// Test Setup
// ============================================================================

/// Static root with the default document and one stylesheet.
pub fn static_root() -> TempDir {
    // ---
    let dir = tempfile::tempdir().expect("create static root");
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(dir.path().join("style.css"), STYLE_CSS).unwrap();
    dir
}

fn test_config(static_dir: &Path) -> AppConfig {
    // ---
    AppConfig {
        server: ServerConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: static_dir.to_path_buf(),
            index_file: "index.html".to_string(),
        },
        metrics: MetricsConfig::default(),
    }
}

async fn spawn(config: &AppConfig, metrics: MetricsPtr) -> SocketAddr {
    // ---
    let app = build_router(config, metrics);
    let listener = TcpListener::bind(config.server.bind_addr()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub metrics: Arc<PrometheusMetrics>,
    _static_root: TempDir,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        Self::with_static_root(static_root()).await
    }

    /// Server whose static root holds no files at all.
    pub async fn without_files() -> Self {
        Self::with_static_root(tempfile::tempdir().unwrap()).await
    }

    pub async fn with_static_root(root: TempDir) -> Self {
        // ---
        let metrics = Arc::new(PrometheusMetrics::new(Arc::new(Registry::new())).unwrap());
        let ptr: MetricsPtr = metrics.clone();
        let addr = spawn(&test_config(root.path()), ptr).await;

        Self {
            addr,
            client: Client::new(),
            metrics,
            _static_root: root,
        }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// GET `path` and read the whole body.
    pub async fn get(&self, path: &str) -> (u16, String) {
        // ---
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|err| panic!("GET {path} failed: {err}"));
        let status = response.status().as_u16();
        let body = response.text().await.expect("Failed to read response body");
        (status, body)
    }

    pub fn counter(&self, name: &str) -> u64 {
        match self.metrics.registry().snapshot(name).map(|m| m.value) {
            Some(MetricValue::Counter(v)) => v,
            other => panic!("{name} is not a counter: {other:?}"),
        }
    }

    pub fn gauge(&self) -> f64 {
        match self.metrics.registry().snapshot(CONCURRENT_METRIC).map(|m| m.value) {
            Some(MetricValue::Gauge(v)) => v,
            other => panic!("gauge missing: {other:?}"),
        }
    }

    pub fn latency(&self) -> HistogramSnapshot {
        match self.metrics.registry().snapshot(LATENCY_METRIC).map(|m| m.value) {
            Some(MetricValue::Histogram(h)) => h,
            other => panic!("histogram missing: {other:?}"),
        }
    }
}

/// Server running the no-op metrics backend.
pub async fn noop_server() -> (SocketAddr, TempDir) {
    // ---
    let root = static_root();
    let addr = spawn(&test_config(root.path()), create_noop_metrics().unwrap()).await;
    (addr, root)
}

// ============================================================================
// Exposition parsing
// ============================================================================

/// Minimal reader for the text exposition format, enough to check what
/// the server writes.
#[derive(Debug, Default)]
pub struct ParsedExposition {
    /// `(name, help)` in output order.
    pub help: Vec<(String, String)>,
    /// name -> declared type.
    pub types: HashMap<String, String>,
    /// Full series identifier (name plus label set) -> value.
    pub samples: HashMap<String, f64>,
}

pub fn parse_exposition(text: &str) -> ParsedExposition {
    // ---
    let mut parsed = ParsedExposition::default();

    for line in text.lines().filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix("# HELP ") {
            let (name, help) = rest.split_once(' ').expect("HELP line has text");
            parsed.help.push((name.to_string(), help.to_string()));
        } else if let Some(rest) = line.strip_prefix("# TYPE ") {
            let (name, kind) = rest.split_once(' ').expect("TYPE line has a kind");
            parsed.types.insert(name.to_string(), kind.to_string());
        } else {
            let (series, value) = line.rsplit_once(' ').expect("sample has a value");
            let value = match value {
                "+Inf" => f64::INFINITY,
                "-Inf" => f64::NEG_INFINITY,
                other => other.parse().unwrap_or_else(|_| panic!("bad value in `{line}`")),
            };
            parsed.samples.insert(series.to_string(), value);
        }
    }

    parsed
}
