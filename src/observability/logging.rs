//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick the log level from `RUST_LOG`, falling back to config
//! - Emit pretty or JSON lines per `observability.log_format`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

pub use tracing_subscriber::util::TryInitError;

/// Default filter directives for a given level.
pub fn default_directives(level: &str) -> String {
    format!("wiki_gateway={level},tower_http={level}")
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.log_level).into());

    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .try_init()
}
