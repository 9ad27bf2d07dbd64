//! Request timeout.
//!
//! Bounds handler execution. An expired request becomes
//! [`AppError::Timeout`], so it is logged and rendered by the global error
//! handler like every other failure.

use std::time::Duration;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tokio::time::timeout;

use crate::http::error::AppError;

pub async fn enforce_timeout(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    timeout(limit, next.run(request))
        .await
        .map_err(|_| AppError::Timeout(limit))
}
