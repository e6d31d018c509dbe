//! Page shapes returned to callers, and upstream error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page summary: identifier, title and canonical article URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikipediaPage {
    pub id: u64,
    pub title: String,
    pub url: String,
}

impl WikipediaPage {
    pub fn new(id: u64, title: impl Into<String>, article_base_url: &str) -> Self {
        let title = title.into();
        Self {
            id,
            url: article_url(article_base_url, &title),
            title,
        }
    }
}

/// Page summary plus whichever content the endpoint asked for.
///
/// Unrequested parts stay `None` and are left out of the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikipediaPageFull {
    #[serde(rename = "metadata")]
    pub meta: WikipediaPage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
}

impl WikipediaPageFull {
    pub fn new(meta: WikipediaPage) -> Self {
        Self {
            meta,
            extract: None,
            categories: None,
            sections: None,
        }
    }
}

/// Canonical article URL: spaces in the title become underscores.
pub fn article_url(article_base_url: &str, title: &str) -> String {
    format!("{}{}", article_base_url, title.replace(' ', "_"))
}

/// Errors that can occur while talking to MediaWiki.
#[derive(Debug, Error)]
pub enum WikiError {
    /// Client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(String),

    /// Connection or transport failure.
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// Upstream request timed out.
    #[error("upstream timeout after {0} seconds")]
    Timeout(u64),

    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Upstream body could not be decoded.
    #[error("invalid upstream response: {0}")]
    Decode(String),

    /// MediaWiki reported an error object.
    #[error("MediaWiki error {code}: {info}")]
    Api { code: String, info: String },

    /// The requested page does not exist.
    #[error("page not found: {0}")]
    NotFound(String),
}

impl WikiError {
    /// MediaWiki error codes meaning the page does not exist.
    const NOT_FOUND_CODES: &'static [&'static str] = &["nosuchpageid", "missingtitle"];

    /// MediaWiki error codes meaning the caller's input was rejected.
    const BAD_INPUT_CODES: &'static [&'static str] = &["invalidtitle", "badinteger", "badvalue"];

    pub fn is_not_found(&self) -> bool {
        match self {
            WikiError::NotFound(_) => true,
            WikiError::Api { code, .. } => Self::NOT_FOUND_CODES.contains(&code.as_str()),
            _ => false,
        }
    }

    pub fn is_bad_input(&self) -> bool {
        matches!(self, WikiError::Api { code, .. } if Self::BAD_INPUT_CODES.contains(&code.as_str()))
    }
}

/// Result type for upstream operations.
pub type WikiResult<T> = Result<T, WikiError>;
