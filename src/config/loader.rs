//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// Starts from the TOML file when one is given (defaults otherwise), then
/// applies `NODE_ENV`, `PORT` and `FRONTEND_URL` from the process environment.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    load_config_with_env(path, |var| std::env::var(var).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env<F>(path: Option<&Path>, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests don't mutate process state.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup("NODE_ENV") {
        config.environment = Environment::from_env_value(&env);
    }

    if let Some(port) = lookup("PORT") {
        config.listener.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                var: "PORT",
                reason: e.to_string(),
            }
        })?;
    }

    // An empty FRONTEND_URL counts as unset.
    if let Some(url) = lookup("FRONTEND_URL") {
        let url = url.trim();
        config.cors.frontend_url = (!url.is_empty()).then(|| url.to_string());
    }

    Ok(())
}
