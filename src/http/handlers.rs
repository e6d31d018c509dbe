//! Route handlers.
//!
//! Each handler coerces its parameters, makes one upstream call through
//! `WikipediaApi`, and encodes the result as JSON. Failures are returned as
//! `GatewayError`, which renders the envelope.

use axum::{
    extract::{RawQuery, State},
    http::{Method, Uri},
    Json,
};

use crate::http::request::{limit_param, parse_limit, parse_page_id, split_titles, PathParam};
use crate::http::response::{GatewayError, GatewayResult};
use crate::http::server::AppState;
use crate::wiki::{WikipediaPage, WikipediaPageFull};

/// Plain-text usage banner served at `/`.
pub const USAGE_BANNER: &str = "Welcome to the Wikipedia API.

Please use one of the following endpoints:
GET /api/v1.0/extracts/{titles}
GET /api/v1.0/search/{value}?limit={limit}
GET /api/v1.0/categories/{pageid}
GET /api/v1.0/sections/{pageid}";

pub async fn index() -> &'static str {
    USAGE_BANNER
}

/// `GET /api/v1.0/extracts/{titles}`
pub async fn get_extracts(
    State(state): State<AppState>,
    PathParam(titles): PathParam<String>,
) -> GatewayResult<Json<Vec<WikipediaPageFull>>> {
    let titles = split_titles(&titles)?;
    tracing::debug!(?titles, "Fetching extracts");

    let pages = state.wiki.extracts(&titles).await?;
    Ok(Json(pages))
}

/// `GET /api/v1.0/search/{value}?limit={limit}`
pub async fn get_search(
    State(state): State<AppState>,
    PathParam(value): PathParam<String>,
    RawQuery(query): RawQuery,
) -> GatewayResult<Json<Vec<WikipediaPage>>> {
    let raw_limit = limit_param(query.as_deref());
    let limit = parse_limit(raw_limit.as_deref());
    if limit.is_none() && raw_limit.is_some() {
        tracing::debug!(limit = ?raw_limit, "Ignoring invalid limit, using default");
    }

    let pages = state.wiki.prefix_search(&value, limit).await?;
    Ok(Json(pages))
}

/// `GET /api/v1.0/categories/{pageid}`
pub async fn get_categories(
    State(state): State<AppState>,
    PathParam(page_id): PathParam<String>,
) -> GatewayResult<Json<WikipediaPageFull>> {
    let page_id = parse_page_id(&page_id)?;
    let page = state.wiki.categories(page_id).await?;
    Ok(Json(page))
}

/// `GET /api/v1.0/sections/{pageid}`
pub async fn get_sections(
    State(state): State<AppState>,
    PathParam(page_id): PathParam<String>,
) -> GatewayResult<Json<WikipediaPageFull>> {
    let page_id = parse_page_id(&page_id)?;
    let page = state.wiki.sections(page_id).await?;
    Ok(Json(page))
}

/// Fallback for paths no route matched.
pub async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(format!("no route for {}", uri.path()))
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> GatewayError {
    GatewayError::MethodNotAllowed(format!("{} {}", method, uri.path()))
}
