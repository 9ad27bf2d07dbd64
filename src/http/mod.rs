//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, JSON extraction)
//!     → cors (origin gate, then CORS response headers)
//!     → timeout.rs (request deadline)
//!     → route handler (`GET /`, `/auth/*`)
//!     → error.rs (any failure → 500 JSON)
//!     → response.rs (body shapes)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod timeout;

pub use error::AppError;
pub use request::{AppJson, UuidRequestId, X_REQUEST_ID};
pub use response::{ErrorBody, ServerStatus};
pub use server::HttpServer;
