//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// MediaWiki upstream settings.
    pub upstream: UpstreamConfig,

    /// Server-side timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// MediaWiki upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// MediaWiki action API endpoint.
    pub api_url: String,

    /// Prefix for canonical article URLs.
    pub article_base_url: String,

    /// User-Agent sent with every upstream request.
    pub user_agent: String,

    /// Total upstream request timeout in seconds.
    pub timeout_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Prefix search limit used when the caller gives none (or an invalid one).
    pub default_search_limit: u32,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            article_base_url: "https://en.wikipedia.org/wiki/".to_string(),
            user_agent: concat!("wiki-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
            default_search_limit: 50,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.upstream.default_search_limit, 50);
        assert_eq!(config.upstream.api_url, "https://en.wikipedia.org/w/api.php");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            port = 8088

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8088);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
