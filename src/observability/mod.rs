//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through trace spans and response headers
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
