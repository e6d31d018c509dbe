//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding `upstream.api_url`.
pub const API_URL_ENV: &str = "WIKI_API_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => write!(f, "Invalid value for {}: {:?}", var, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides read through `lookup`.
///
/// Empty values are ignored, so `PORT=` behaves like an unset variable.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::Env {
            var: PORT_ENV,
            value: port.clone(),
        })?;
    }

    if let Some(api_url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.upstream.api_url = api_url;
    }

    Ok(())
}
