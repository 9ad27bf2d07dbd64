//! Origin admission policy.
//!
//! # Responsibilities
//! - Hold the allow-list built once at startup
//! - Decide, per request, whether an `Origin` is admitted
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no locks, no mutation after construction
//! - Exactly three admission rules, checked in order: no origin, exact
//!   allow-list match, `.vercel.app` suffix
//! - Matching is case-sensitive; the leading dot of the suffix is required so
//!   `fakevercel.app` does not pass
//! - Denial is a typed error, never a bare `false`

use thiserror::Error;

use crate::config::CorsConfig;

/// Local development frontends that are always admitted.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:5174",
];

/// Any origin ending with this suffix is admitted (Vercel preview and
/// production deployments).
pub const WILDCARD_SUFFIX: &str = ".vercel.app";

/// Immutable list of exact-match origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    origins: Vec<String>,
}

impl AllowList {
    /// Build the allow-list from the fixed development origins plus one
    /// optional extra origin. Blank values are ignored.
    pub fn new(extra: Option<&str>) -> Self {
        let mut origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|o| o.to_string())
            .collect();

        if let Some(extra) = extra.map(str::trim).filter(|o| !o.is_empty()) {
            if !origins.iter().any(|o| o == extra) {
                origins.push(extra.to_string());
            }
        }

        Self { origins }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(config.frontend_url.as_deref())
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Why an origin was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No `Origin` header: same-origin or non-browser client.
    NoOrigin,
    /// Listed in the allow-list.
    ExactMatch,
    /// Matched the `.vercel.app` suffix rule.
    WildcardMatch,
}

impl Decision {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::NoOrigin => "no_origin",
            Decision::ExactMatch => "exact",
            Decision::WildcardMatch => "wildcard",
        }
    }
}

/// An origin that matched none of the admission rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Not allowed by CORS")]
pub struct CorsRejection {
    /// The rejected origin, lossily decoded if it was not valid text.
    pub origin: String,
}

/// The complete admission policy: allow-list plus suffix rule.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow_list: AllowList,
}

impl OriginPolicy {
    pub fn new(allow_list: AllowList) -> Self {
        Self { allow_list }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(AllowList::from_config(config))
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Decide whether `origin` is admitted.
    pub fn decide(&self, origin: Option<&str>) -> Result<Decision, CorsRejection> {
        admit(origin, &self.allow_list).ok_or_else(|| CorsRejection {
            origin: origin.unwrap_or_default().to_string(),
        })
    }
}

/// Boolean form of [`OriginPolicy::decide`].
pub fn is_origin_allowed(origin: Option<&str>, allow_list: &AllowList) -> bool {
    admit(origin, allow_list).is_some()
}

fn admit(origin: Option<&str>, allow_list: &AllowList) -> Option<Decision> {
    let Some(origin) = origin else {
        return Some(Decision::NoOrigin);
    };

    if allow_list.contains(origin) {
        Some(Decision::ExactMatch)
    } else if origin.ends_with(WILDCARD_SUFFIX) {
        Some(Decision::WildcardMatch)
    } else {
        None
    }
}
