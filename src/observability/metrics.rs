//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_requests_total` (counter): MediaWiki calls by action, outcome
//! - `gateway_upstream_duration_seconds` (histogram): MediaWiki latency
//!
//! Without an installed recorder every call here is a no-op.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::Label;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route.to_string()),
        Label::new("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", labels.clone()).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream MediaWiki call.
pub fn record_upstream(action: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("gateway_upstream_requests_total", "action" => action, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("gateway_upstream_duration_seconds", "action" => action)
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording method, matched route template, status and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
