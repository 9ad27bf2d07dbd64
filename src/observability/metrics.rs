//! Metrics collection and exposition.
//!
//! # Metrics
//! - `origin_gate_requests_total` (counter): requests by method, status
//! - `origin_gate_request_duration_seconds` (histogram): latency distribution
//! - `origin_gate_cors_decisions_total` (counter): admissions by rule, denials
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus endpoint is opt-in (`observability.metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "origin_gate_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "origin_gate_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one origin decision (`no_origin`, `exact`, `wildcard`, `denied`).
pub fn record_cors_decision(decision: &'static str) {
    metrics::counter!("origin_gate_cors_decisions_total", "decision" => decision).increment(1);
}

/// Middleware timing every request.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let response = next.run(request).await;

    record_request(method.as_str(), response.status().as_u16(), start);
    response
}
