//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port, timeouts, limits)
//! - Check that the configured frontend origin is one a browser could send
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("cors.frontend_url {value:?} is not a valid origin: {reason}")]
    InvalidFrontendUrl { value: String, reason: String },

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if let Some(frontend_url) = &config.cors.frontend_url {
        if let Err(reason) = check_origin(frontend_url) {
            errors.push(ValidationError::InvalidFrontendUrl {
                value: frontend_url.clone(),
                reason,
            });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_socket_addr().is_none()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Browsers send the serialized origin: lowercase scheme and host, no path,
/// default port omitted. Anything else can never match exactly.
fn check_origin(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }

    let serialized = url.origin().ascii_serialization();
    if serialized != value {
        return Err(format!("expected serialized origin {:?}", serialized));
    }

    Ok(())
}
