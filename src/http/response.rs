//! Response envelope and error mapping.
//!
//! # Responsibilities
//! - Define the `{status, message}` envelope used by every error reply
//! - Map upstream errors to gateway status codes
//!
//! # Design Decisions
//! - One error shape for all routes; never a 200 with an error body
//! - Upstream timeouts result in 504 Gateway Timeout

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wiki::WikiError;

/// Body of every error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub message: String,
}

/// Errors surfaced to gateway clients.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope {
            status: self.status().as_u16(),
            message: self.to_string(),
        }
    }
}

impl From<WikiError> for GatewayError {
    fn from(err: WikiError) -> Self {
        if err.is_not_found() {
            return GatewayError::NotFound(err.to_string());
        }
        if err.is_bad_input() {
            return GatewayError::BadRequest(err.to_string());
        }
        match err {
            WikiError::Timeout(_) => GatewayError::UpstreamTimeout(err.to_string()),
            other => GatewayError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(self.envelope())).into_response()
    }
}

/// Result type for handlers.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::MethodNotAllowed("x".into()).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(GatewayError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            GatewayError::UpstreamTimeout("x".into()).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_from_wiki_error() {
        let not_found: GatewayError = WikiError::Api {
            code: "nosuchpageid".into(),
            info: "There is no page with ID 99.".into(),
        }
        .into();
        assert!(matches!(not_found, GatewayError::NotFound(_)));

        let bad: GatewayError = WikiError::Api {
            code: "invalidtitle".into(),
            info: "Bad title \"<>\".".into(),
        }
        .into();
        assert!(matches!(bad, GatewayError::BadRequest(_)));

        let other: GatewayError = WikiError::Api {
            code: "internal_api_error".into(),
            info: "boom".into(),
        }
        .into();
        assert!(matches!(other, GatewayError::Upstream(_)));

        assert!(matches!(
            GatewayError::from(WikiError::Timeout(5)),
            GatewayError::UpstreamTimeout(_)
        ));
        assert!(matches!(
            GatewayError::from(WikiError::NotFound("Foo".into())),
            GatewayError::NotFound(_)
        ));
    }

    #[test]
    fn test_envelope() {
        let envelope = GatewayError::NotFound("page id 5".into()).envelope();
        assert_eq!(
            envelope,
            ResponseEnvelope {
                status: 404,
                message: "not found: page id 5".into(),
            }
        );
    }
}
