//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: health route, `/auth` nest
//! - Wire up middleware in the order the pipeline requires
//! - Bind server to listener and serve until shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → TraceLayer → PropagateRequestId → metrics
//!     → handle_errors (global error handler)
//!     → cors_middleware (origin gate, before any body is read)
//!     → CorsLayer (allow headers, preflight)
//!     → CatchPanic → enforce_timeout
//!     → DefaultBodyLimit → routes
//! ```
//!
//! Panics and timeouts are turned into errors inside `CorsLayer`, so an
//! admitted origin keeps its CORS headers on error responses too.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::cors::{cors_layer, cors_middleware, OriginPolicy};
use crate::http::error::{handle_errors, panic_response};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::timeout::enforce_timeout;
use crate::http::response::ServerStatus;
use crate::lifecycle::shutdown;
use crate::observability::{metrics, tracing::make_request_span};

/// HTTP server for the application.
pub struct HttpServer {
    config: ServerConfig,
    policy: Arc<OriginPolicy>,
    auth_routes: Option<Router>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The origin policy is built here, once; it never changes afterwards.
    pub fn new(config: ServerConfig) -> Self {
        let policy = Arc::new(OriginPolicy::from_config(&config.cors));
        Self {
            config,
            policy,
            auth_routes: None,
        }
    }

    /// Mount the authentication routes under `/auth`.
    pub fn with_auth_routes(mut self, routes: Router) -> Self {
        self.auth_routes = Some(routes);
        self
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    /// The complete application, ready to serve or to embed elsewhere.
    pub fn router(&self) -> Router {
        build_router(&self.config, self.policy.clone(), self.auth_routes.clone())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let origins: Vec<&str> = self.policy.allow_list().iter().collect();
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            allowed_origins = ?origins,
            "HTTP server starting"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(
    config: &ServerConfig,
    policy: Arc<OriginPolicy>,
    auth_routes: Option<Router>,
) -> Router {
    let mut router = Router::new().route("/", get(server_status));
    if let Some(auth_routes) = auth_routes {
        router = router.nest("/auth", auth_routes);
    }

    let request_timeout = Duration::from_secs(config.timeouts.request_secs);

    // Over-limit bodies surface as a JsonRejection, i.e. an ordinary AppError.
    router
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                .layer(middleware::from_fn(metrics::track_requests))
                .layer(middleware::from_fn_with_state(config.environment, handle_errors))
                .layer(middleware::from_fn_with_state(policy.clone(), cors_middleware))
                .layer(cors_layer(policy))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(middleware::from_fn_with_state(request_timeout, enforce_timeout)),
        )
}

/// `GET /`
async fn server_status() -> Json<ServerStatus> {
    Json(ServerStatus::running())
}
