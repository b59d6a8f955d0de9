//! Prometheus text exposition format (version 0.0.4).

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};

/// Content type served alongside the rendered text.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encodes `families` in the order given.
///
/// Encoding failures are logged and yield an empty body; a scrape must
/// never take the server down.
pub fn render(families: &[MetricFamily]) -> String {
    // ---
    let encoder = TextEncoder::new();
    let mut buffer = Vec::with_capacity(1024);
    if let Err(err) = encoder.encode(families, &mut buffer) {
        tracing::error!(?err, "failed to encode prometheus metrics");
        return String::new();
    }

    match String::from_utf8(buffer) {
        Ok(text) => text,
        Err(err) => {
            tracing::error!(?err, "prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Spells a bucket bound or sample value the way the exposition text does.
///
/// Integral values print without a fraction (`1`, `5`); non-finite values
/// use the Prometheus spellings.
pub fn format_value(v: f64) -> String {
    // ---
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
