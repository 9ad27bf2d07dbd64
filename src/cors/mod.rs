//! Cross-origin request gatekeeping.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → middleware.rs (read Origin header)
//!     → policy.rs (no origin | exact match | *.vercel.app | reject)
//!     → rejected: AppError::CorsRejected → global error handler
//!     → admitted: CorsLayer echoes origin + credentials, answers preflight
//! ```

pub mod middleware;
pub mod policy;

pub use middleware::{cors_layer, cors_middleware};
pub use policy::{is_origin_allowed, AllowList, CorsRejection, Decision, OriginPolicy};
