//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits within MediaWiki bounds)
//! - Check URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::wiki::MAX_SEARCH_LIMIT;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("invalid URL in {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request_secs}) must exceed upstream.timeout_secs ({upstream_secs})")]
    RequestTimeoutTooShort { request_secs: u64, upstream_secs: u64 },

    #[error("upstream.default_search_limit must be between 1 and {max}, got {value}")]
    SearchLimitOutOfRange { value: u32, max: u32 },

    #[error("upstream.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("invalid observability.metrics_address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    for (field, value) in [
        ("upstream.api_url", &config.upstream.api_url),
        ("upstream.article_base_url", &config.upstream.article_base_url),
    ] {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    } else if config.timeouts.request_secs <= config.upstream.timeout_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            upstream_secs: config.upstream.timeout_secs,
        });
    }

    let limit = config.upstream.default_search_limit;
    if limit == 0 || limit > MAX_SEARCH_LIMIT {
        errors.push(ValidationError::SearchLimitOutOfRange {
            value: limit,
            max: MAX_SEARCH_LIMIT,
        });
    }

    if config.upstream.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
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
