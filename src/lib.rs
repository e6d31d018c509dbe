//! Wikipedia REST gateway library.
//!
//! Translates a small REST surface into MediaWiki API calls and reshapes the
//! answers into a compact JSON contract.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod wiki;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use wiki::{WikipediaApi, WikipediaClient};
