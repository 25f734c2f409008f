use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, TextEncoder};
use tracing::error;

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }

    match String::from_utf8(buffer) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Metrics output was not utf-8");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}
