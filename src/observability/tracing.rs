//! Per-request spans.
//!
//! Every request gets one `request` span carrying method, path and request
//! ID, so the CORS and error-handler log lines can be correlated.

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::request_id;

/// `TraceLayer::make_span_with` callback.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}
