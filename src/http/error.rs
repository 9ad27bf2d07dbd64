//! Global error handling.
//!
//! # Responsibilities
//! - One error type for everything that can fail inside the pipeline
//! - Render every failure as the same 500 JSON body
//! - Log each failure exactly once, with its full report
//! - Turn handler panics into that same response
//!
//! # Design Decisions
//! - `AppError::into_response` cannot see configuration, so it renders the
//!   production body and stashes an [`ErrorReport`] in the response
//!   extensions; [`handle_errors`] (outermost) logs it and adds `details`
//!   when running in development
//! - The status is always 500, CORS rejections included

use std::any::Any;
use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::config::Environment;
use crate::cors::CorsRejection;
use crate::http::response::ErrorBody;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Every failure the request pipeline can surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request's `Origin` matched no admission rule.
    #[error("{0}")]
    CorsRejected(#[from] CorsRejection),

    /// The JSON request body could not be read or parsed.
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    /// Any other downstream failure.
    #[error("{message}")]
    Internal {
        message: String,
        /// Extra context for the log line (e.g. the statement that failed).
        /// Never sent to the client.
        query: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// A handler panicked.
    #[error("{0}")]
    Panic(String),

    /// The handler did not finish within the request timeout.
    #[error("Request timed out")]
    Timeout(Duration),
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            query: None,
            source: None,
        }
    }

    /// Wrap an arbitrary error, keeping it as the source for the report.
    pub fn from_source<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AppError::Internal {
            message: err.to_string(),
            query: None,
            source: Some(Box::new(err)),
        }
    }

    /// Attach the query that was running when the error happened.
    pub fn with_query(self, query: impl Into<String>) -> Self {
        match self {
            AppError::Internal { message, source, .. } => AppError::Internal {
                message,
                query: Some(query.into()),
                source,
            },
            other => other,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            AppError::Internal { query, .. } => query.as_deref(),
            _ => None,
        }
    }

    /// Variant, message and `source()` chain. Leaves out `query`.
    pub fn report(&self) -> String {
        let mut report = match self {
            AppError::CorsRejected(rejection) => {
                format!("CorsRejected: origin {:?} matched no rule", rejection.origin)
            }
            AppError::JsonBody(rejection) => format!("JsonBody: {:?}", rejection),
            AppError::Internal { message, .. } => format!("Internal: {}", message),
            AppError::Panic(message) => format!("Panic: {}", message),
            AppError::Timeout(limit) => format!("Timeout: no response within {:?}", limit),
        };
        let mut source = self.source();
        while let Some(cause) = source {
            report.push_str("\n  caused by: ");
            report.push_str(&cause.to_string());
            source = cause.source();
        }
        report
    }
}

/// What [`handle_errors`] needs to log and finish an error response.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub details: String,
    pub query: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = ErrorReport {
            message: self.to_string(),
            details: self.report(),
            query: self.query().map(str::to_string),
        };

        let mut response = (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(report.message.clone(), None)),
        )
            .into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Global error handler.
///
/// Must wrap every other application layer so it sees every [`AppError`].
pub async fn handle_errors(
    State(environment): State<Environment>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    tracing::error!(
        error = %report.message,
        stack = %report.details,
        query = ?report.query,
        "Error details"
    );

    if !environment.is_development() {
        return response;
    }

    // Keep status and headers set further in (request id, vary, ...).
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = Json(ErrorBody::new(report.message, Some(report.details)))
        .into_response()
        .into_body();
    Response::from_parts(parts, body)
}

/// `CatchPanicLayer` handler: a panic becomes an ordinary [`AppError`].
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Panic(message).into_response()
}
