//! Origin-gated HTTP server library.
//!
//! Exposes the configured application (`HttpServer::router`) so it can be
//! served by the bundled binary or embedded and tested directly.

pub mod config;
pub mod cors;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use cors::{is_origin_allowed, AllowList, OriginPolicy};
pub use http::{AppError, HttpServer};
pub use lifecycle::Shutdown;
