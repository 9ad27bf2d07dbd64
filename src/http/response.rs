//! Response bodies.
//!
//! # Responsibilities
//! - Shape of the health-check payload
//! - Shape of the global error payload
//!
//! # Design Decisions
//! - Timestamps are UTC, millisecond precision, `Z` suffix
//!   (e.g. `2024-05-01T12:00:00.123Z`)
//! - `details` is omitted from the JSON entirely when absent

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerStatus {
    pub message: String,
    pub status: String,
    pub timestamp: String,
}

impl ServerStatus {
    pub fn running() -> Self {
        Self {
            message: "Server is running!".to_string(),
            status: "OK".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            message: "Something went wrong!".to_string(),
            error: error.into(),
            details,
        }
    }
}
