//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; running with no file at all is supported
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::{ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig, UpstreamConfig};
