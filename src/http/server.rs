//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, metrics)
//! - Bind server to listener and serve until shutdown

use axum::{
    error_handling::HandleErrorLayer,
    http::Method,
    middleware,
    routing::get,
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::GatewayError;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::wiki::{WikiResult, WikipediaApi, WikipediaClient};

/// Versioned prefix of every API route.
pub const API_PREFIX: &str = "/api/v1.0";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub wiki: Arc<dyn WikipediaApi>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server backed by the real MediaWiki client.
    pub fn new(config: GatewayConfig) -> WikiResult<Self> {
        let client = WikipediaClient::new(&config.upstream)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a server backed by any `WikipediaApi` implementation.
    pub fn with_client(config: GatewayConfig, wiki: Arc<dyn WikipediaApi>) -> Self {
        let state = AppState { wiki };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/extracts/{titles}", get(handlers::get_extracts))
            .route("/search/{value}", get(handlers::get_search))
            .route("/categories/{pageid}", get(handlers::get_categories))
            .route("/sections/{pageid}", get(handlers::get_sections));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS]);

        let request_secs = config.timeouts.request_secs;
        let timeout = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                timeout_error(err, request_secs)
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(request_secs)));

        // Method fallback only reaches routes already registered.
        Router::new()
            .route("/", get(handlers::index))
            .nest(API_PREFIX, api)
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(cors)
            .layer(timeout)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Clone of the fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_url = %self.config.upstream.api_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                wait_for(shutdown).await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Render a failure of the request-timeout layer as an envelope.
fn timeout_error(err: BoxError, request_secs: u64) -> GatewayError {
    if err.is::<Elapsed>() {
        GatewayError::UpstreamTimeout(format!("request exceeded {}s", request_secs))
    } else {
        GatewayError::Upstream(err.to_string())
    }
}
