//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, parameter coercion)
//!     → handlers.rs (one upstream call per request)
//!     → response.rs (JSON body or error envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{GatewayError, GatewayResult, ResponseEnvelope};
pub use server::{AppState, HttpServer, API_PREFIX};
