use axum::{http::StatusCode, Json};

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Responds with the health status of the server.
///
/// The page server has no backing services, so reaching this handler is
/// the whole check. The path is not monitored and never shows up in the
/// request metrics.
///
/// # Responses
/// - `200 OK` with `{ "status": "ok" }`.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}
