//! CORS middleware.
//!
//! Two pieces bind [`OriginPolicy`] to axum:
//! - [`cors_middleware`] is the gate. It reads `Origin`, asks the policy, and
//!   turns a denial into [`AppError::CorsRejected`] for the global error
//!   handler. Admitted requests pass through untouched.
//! - [`cors_layer`] is tower-http's `CorsLayer` driven by the same policy. It
//!   echoes admitted origins with credentials and answers preflights.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::cors::policy::{is_origin_allowed, CorsRejection, Decision, OriginPolicy};
use crate::http::error::AppError;
use crate::observability::metrics;

/// Methods advertised on preflight.
pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Request headers advertised on preflight.
pub const ALLOWED_HEADERS: [HeaderName; 2] = [header::CONTENT_TYPE, header::AUTHORIZATION];

/// Origin gate. Must run before any route and before the body is read.
pub async fn cors_middleware(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    match evaluate(&policy, request.headers()) {
        Ok((origin, decision)) => {
            tracing::debug!(
                origin = origin.as_deref().unwrap_or("-"),
                decision = decision.as_str(),
                "Origin admitted"
            );
            metrics::record_cors_decision(decision.as_str());
            Ok(next.run(request).await)
        }
        Err(rejection) => {
            tracing::warn!(
                origin = %rejection.origin,
                method = %request.method(),
                path = %request.uri().path(),
                "Origin rejected"
            );
            metrics::record_cors_decision("denied");
            Err(rejection.into())
        }
    }
}

/// Response headers for admitted origins. The exact origin is echoed, never
/// `*`, since credentials are allowed.
pub fn cors_layer(policy: Arc<OriginPolicy>) -> CorsLayer {
    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _parts| {
        origin
            .to_str()
            .is_ok_and(|origin| is_origin_allowed(Some(origin), policy.allow_list()))
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS)
        .vary([header::ORIGIN])
}

fn evaluate(
    policy: &OriginPolicy,
    headers: &HeaderMap,
) -> Result<(Option<String>, Decision), CorsRejection> {
    let origin = request_origin(headers)?;
    let decision = policy.decide(origin.as_deref())?;
    Ok((origin, decision))
}

/// The `Origin` header, if any. A value that is not visible ASCII can match
/// nothing, so it is rejected outright.
fn request_origin(headers: &HeaderMap) -> Result<Option<String>, CorsRejection> {
    let Some(value) = headers.get(header::ORIGIN) else {
        return Ok(None);
    };

    match value.to_str() {
        Ok(origin) => Ok(Some(origin.to_string())),
        Err(_) => Err(CorsRejection {
            origin: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        }),
    }
}
