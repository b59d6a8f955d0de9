//! Request instrumentation for the monitored page paths.
//!
//! A monitored exchange is considered finished when its response body has
//! been handed to the transport in full, not when the handler returns. The
//! body is therefore wrapped in [`TrackedBody`], which completes the
//! exchange on end of stream (or once every `Content-Length` byte went out)
//! and aborts it if the body is dropped early. A request whose handler
//! future is dropped before producing a response aborts through the same
//! guard.

use crate::app_state::AppState;
use crate::domain::InFlightRequest;
use axum::{
    body::{Body, BodyDataStream, Bytes, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Axum middleware measuring requests to the monitored paths.
///
/// Requests to any other path are forwarded untouched.
pub(crate) async fn track_page_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    if !state.is_monitored(request.uri().path()) {
        return next.run(request).await;
    }

    let head_only = request.method() == Method::HEAD;
    let mut exchange = InFlightRequest::start(state.metrics().clone());

    // If this future is dropped while awaiting, `exchange` drops with it
    // and records the abort.
    let response = next.run(request).await;
    exchange.set_status(response.status().as_u16());

    let (mut parts, body) = response.into_parts();
    let remaining = match content_length(&parts.headers) {
        Some(len) => Some(len),
        None => {
            // The stream wrapper hides the size hint from hyper, so pin
            // the length down in the header while it is still known.
            // 204 and 304 responses carry no length header.
            let exact = body.size_hint().exact();
            let bodyless =
                parts.status == StatusCode::NO_CONTENT || parts.status == StatusCode::NOT_MODIFIED;
            if let (Some(len), false) = (exact, bodyless) {
                parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
            }
            exact
        }
    };

    if head_only || body.is_end_stream() || remaining == Some(0) {
        exchange.complete();
        return Response::from_parts(parts, body);
    }

    let tracked = TrackedBody {
        inner: body.into_data_stream(),
        exchange,
        remaining,
    };
    Response::from_parts(parts, Body::from_stream(tracked))
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Response body that finishes its exchange when delivery ends.
struct TrackedBody {
    inner: BodyDataStream,
    exchange: InFlightRequest,
    /// Bytes still owed when the length is known up front.
    remaining: Option<u64>,
}

impl Stream for TrackedBody {
    type Item = Result<Bytes, axum::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // ---
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_next(cx);

        match &polled {
            Poll::Ready(Some(Ok(chunk))) => {
                // hyper stops polling once a sized body is fully written,
                // so the end of stream may never be observed.
                if let Some(remaining) = this.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(chunk.len() as u64);
                    if *remaining == 0 {
                        this.exchange.complete();
                    }
                }
            }
            Poll::Ready(Some(Err(err))) => {
                tracing::warn!(%err, "response body failed mid-stream");
                this.exchange.abort();
            }
            Poll::Ready(None) => {
                this.exchange.complete();
            }
            Poll::Pending => {}
        }

        polled
    }
}
