use page_latency_monitor::prometheus::{
    format_value, MetricValue, CONCURRENT_METRIC, ERROR_METRIC, LATENCY_BUCKETS, LATENCY_METRIC,
    OVER_2S_METRIC, SUCCESS_METRIC,
};
use std::sync::Arc;

mod common;

// Each test owns its server and registry, so they can run in parallel.

#[tokio::test]
async fn metrics_endpoint_with_prometheus() {
    // ---
    let server = common::TestServer::new().await;

    // First, hit the monitored pages
    assert_eq!(server.get("/").await.0, 200);
    assert_eq!(server.get("/index.html").await.0, 200);

    let res = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body = res.text().await.unwrap();
    let parsed = common::parse_exposition(&body);

    let names: Vec<&str> = parsed.help.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        [LATENCY_METRIC, SUCCESS_METRIC, ERROR_METRIC, OVER_2S_METRIC, CONCURRENT_METRIC]
    );
    assert_eq!(parsed.types[LATENCY_METRIC], "histogram");
    assert_eq!(parsed.types[SUCCESS_METRIC], "counter");
    assert_eq!(parsed.types[CONCURRENT_METRIC], "gauge");

    assert_eq!(parsed.samples[SUCCESS_METRIC], 2.0);
    assert_eq!(parsed.samples[ERROR_METRIC], 0.0);
    assert_eq!(parsed.samples[OVER_2S_METRIC], 0.0);
    assert_eq!(parsed.samples[CONCURRENT_METRIC], 0.0);
    assert_eq!(parsed.samples["request_latency_seconds_count"], 2.0);
    assert_eq!(
        parsed.samples["request_latency_seconds_bucket{le=\"+Inf\"}"],
        2.0
    );
    for bound in LATENCY_BUCKETS {
        let series = format!("request_latency_seconds_bucket{{le=\"{}\"}}", format_value(bound));
        assert!(parsed.samples.contains_key(&series), "missing {series}");
    }
}

#[tokio::test]
async fn scraped_values_match_registry() {
    // ---
    let server = common::TestServer::new().await;
    for path in ["/", "/index.html", "/missing.html", "/", "/style.css"] {
        server.get(path).await;
    }

    let (_, body) = server.get("/metrics").await;
    let parsed = common::parse_exposition(&body);

    for metric in server.metrics.registry().collect() {
        let name = &metric.name;
        match metric.value {
            MetricValue::Counter(v) => assert_eq!(parsed.samples[name], v as f64, "{name}"),
            MetricValue::Gauge(v) => assert_eq!(parsed.samples[name], v, "{name}"),
            MetricValue::Histogram(h) => {
                for (bound, count) in h.buckets {
                    let series = format!("{name}_bucket{{le=\"{}\"}}", format_value(bound));
                    assert_eq!(parsed.samples[&series], count as f64, "{series}");
                }
                assert_eq!(parsed.samples[&format!("{name}_sum")], h.sum);
                assert_eq!(parsed.samples[&format!("{name}_count")], h.count as f64);
            }
        }
    }
}

#[tokio::test]
async fn metrics_endpoint_with_noop() {
    // ---
    let (addr, _root) = common::noop_server().await;
    let client = reqwest::Client::new();

    let _ = client.get(format!("http://{addr}/")).send().await.unwrap();

    let res = client
        .get(format!("http://{addr}/metrics"))
        .send()
        .await
        .unwrap();

    // Should still return success even with noop metrics
    assert!(
        res.status().is_success(),
        "Metrics endpoint should return success even with noop"
    );
    assert_eq!(res.text().await.unwrap(), "");
}

#[tokio::test]
async fn metrics_endpoint_survives_load() {
    // ---
    let server = Arc::new(common::TestServer::new().await);

    // Generate some load
    let futures = (0..21).map(|i| {
        let server = Arc::clone(&server);
        async move {
            let endpoint = match i % 3 {
                0 => "/health",
                1 => "/",
                _ => "/metrics",
            };
            server.client.get(server.url(endpoint)).send().await
        }
    });

    let responses = futures::future::join_all(futures).await;

    // All requests should succeed
    for (i, response) in responses.into_iter().enumerate() {
        // ---
        let response = response.unwrap_or_else(|_| panic!("Request {i} should succeed"));
        assert!(
            response.status().is_success(),
            "Request {i} should return success"
        );
        response.bytes().await.unwrap();
    }

    assert_eq!(server.counter(SUCCESS_METRIC), 7);
    assert_eq!(server.counter(ERROR_METRIC), 0);
    assert_eq!(server.gauge(), 0.0);
}

#[tokio::test]
async fn metrics_content_type_is_correct() {
    // ---
    let server = common::TestServer::new().await;

    let res = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(
        content_type.as_deref(),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
}

#[tokio::test]
async fn scraping_metrics_is_not_measured() {
    // ---
    let server = common::TestServer::new().await;
    for _ in 0..3 {
        server.get("/metrics").await;
    }
    server.get("/health").await;

    assert_eq!(server.counter(SUCCESS_METRIC), 0);
    assert_eq!(server.counter(ERROR_METRIC), 0);
    assert_eq!(server.latency().count, 0);
}
