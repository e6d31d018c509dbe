//! Wikipedia upstream subsystem.
//!
//! # Data Flow
//! ```text
//! handler parameters
//!     → client.rs (build api.php query, send with timeouts)
//!     → api.rs (decode MediaWiki JSON, detect error objects)
//!     → types.rs (page summary / full page shapes)
//! ```
//!
//! # Design Decisions
//! - Handlers depend on the `WikipediaApi` trait, not on `reqwest`
//! - One upstream request per gateway request; no caching, no retries
//! - `formatversion=2` so pages arrive as an array with boolean flags

pub mod api;
pub mod client;
pub mod types;

pub use client::{WikipediaApi, WikipediaClient, MAX_SEARCH_LIMIT};
pub use types::{article_url, WikiError, WikiResult, WikipediaPage, WikipediaPageFull};
