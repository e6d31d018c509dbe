//! Request parameter handling and request IDs.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Coerce path/query parameters into typed values
//! - Turn extractor rejections into `GatewayError`
//!
//! # Design Decisions
//! - A bad `limit` degrades to the default limit; a bad page id is rejected
//! - Titles are split on `|` and forwarded as-is otherwise

use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, HeaderName, Request},
};
use serde::de::DeserializeOwned;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::{GatewayError, GatewayResult};

/// Header carrying the request ID on both request and response.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Produces a fresh UUID v4 for requests arriving without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        Uuid::new_v4().to_string().parse().ok().map(RequestId::new)
    }
}

/// `Path` extractor whose rejection renders the error envelope.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParam(value)),
            Err(rejection) => Err(GatewayError::BadRequest(rejection.body_text())),
        }
    }
}

/// Raw `limit` from a query string. The first occurrence wins; the query is
/// never rejected, so a malformed value can fall back to the default.
pub fn limit_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.into_owned())
}

/// Parse a search limit. Missing, unparsable or zero values yield `None`,
/// which the upstream client resolves to its default limit.
pub fn parse_limit(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok()).filter(|l| *l > 0)
}

/// Parse a page id path segment.
pub fn parse_page_id(raw: &str) -> GatewayResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| GatewayError::BadRequest(format!("invalid page id: {:?}", raw)))
}

/// Split the `{titles}` segment on `|`, dropping blank entries.
pub fn split_titles(raw: &str) -> GatewayResult<Vec<String>> {
    let titles: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if titles.is_empty() {
        return Err(GatewayError::BadRequest("no title given".to_string()));
    }
    Ok(titles)
}
