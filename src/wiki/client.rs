//! MediaWiki API client.
//!
//! # Responsibilities
//! - Issue `action=query` / `action=parse` requests against `api.php`
//! - Enforce connect and total timeouts on every upstream call
//! - Translate MediaWiki pages into `WikipediaPage` / `WikipediaPageFull`
//! - Surface MediaWiki error objects as `WikiError`

use async_trait::async_trait;
use std::time::Instant;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::wiki::api::{ApiResponse, ParseBody};
use crate::wiki::types::{WikiError, WikiResult, WikipediaPage, WikipediaPageFull};

/// Upper bound MediaWiki accepts for `gpslimit`.
pub const MAX_SEARCH_LIMIT: u32 = 500;

/// The four lookups the gateway exposes.
#[async_trait]
pub trait WikipediaApi: Send + Sync {
    /// Extracts for the given titles. Pages that do not exist are skipped.
    async fn extracts(&self, titles: &[String]) -> WikiResult<Vec<WikipediaPageFull>>;

    /// Articles whose title starts with `prefix`, in upstream rank order.
    ///
    /// `None` selects the configured default limit.
    async fn prefix_search(&self, prefix: &str, limit: Option<u32>) -> WikiResult<Vec<WikipediaPage>>;

    /// Category names of an article.
    async fn categories(&self, page_id: u64) -> WikiResult<WikipediaPageFull>;

    /// Section anchors of an article.
    async fn sections(&self, page_id: u64) -> WikiResult<WikipediaPageFull>;
}

/// `reqwest`-backed MediaWiki client.
#[derive(Clone)]
pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: reqwest::Url,
    article_base_url: String,
    default_search_limit: u32,
    timeout_secs: u64,
}

impl WikipediaClient {
    /// Create a new client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> WikiResult<Self> {
        let api_url: reqwest::Url = config.api_url.parse().map_err(|e| {
            WikiError::Client(format!("invalid API URL '{}': {}", config.api_url, e))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| WikiError::Client(e.to_string()))?;

        tracing::info!(
            api_url = %api_url,
            timeout_secs = config.timeout_secs,
            "Wikipedia client initialized"
        );

        Ok(Self {
            http,
            api_url,
            article_base_url: config.article_base_url.clone(),
            default_search_limit: config.default_search_limit,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Effective `gpslimit` for a caller-supplied limit.
    pub fn effective_limit(&self, limit: Option<u32>) -> u32 {
        limit
            .filter(|l| *l > 0)
            .unwrap_or(self.default_search_limit)
            .min(MAX_SEARCH_LIMIT)
    }

    fn page(&self, id: u64, title: &str) -> WikipediaPage {
        WikipediaPage::new(id, title, &self.article_base_url)
    }

    fn parse_page(&self, parse: &ParseBody) -> WikipediaPageFull {
        WikipediaPageFull::new(self.page(parse.pageid, &parse.title))
    }

    /// Send one `api.php` request and decode the body.
    async fn call(&self, action: &'static str, params: &[(&str, String)]) -> WikiResult<ApiResponse> {
        let start = Instant::now();
        let result = self.send(action, params).await;
        metrics::record_upstream(action, result.is_ok(), start);

        if let Err(e) = &result {
            tracing::debug!(action, error = %e, "MediaWiki call failed");
        }
        result
    }

    async fn send(&self, action: &'static str, params: &[(&str, String)]) -> WikiResult<ApiResponse> {
        let response = self
            .http
            .get(self.api_url.clone())
            .query(&[("action", action), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiError::Status(status.as_u16()));
        }

        let body: ApiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                WikiError::Timeout(self.timeout_secs)
            } else {
                WikiError::Decode(e.to_string())
            }
        })?;

        body.into_result()
    }

    fn transport_error(&self, e: reqwest::Error) -> WikiError {
        if e.is_timeout() {
            WikiError::Timeout(self.timeout_secs)
        } else {
            WikiError::Transport(e.to_string())
        }
    }

    async fn parse(&self, page_id: u64, prop: &str) -> WikiResult<ParseBody> {
        let res = self
            .call(
                "parse",
                &[("pageid", page_id.to_string()), ("prop", prop.to_string())],
            )
            .await?;

        res.parse
            .ok_or_else(|| WikiError::NotFound(format!("page id {}", page_id)))
    }
}

#[async_trait]
impl WikipediaApi for WikipediaClient {
    async fn extracts(&self, titles: &[String]) -> WikiResult<Vec<WikipediaPageFull>> {
        let joined = titles.join("|");
        let res = self
            .call(
                "query",
                &[("prop", "extracts".to_string()), ("titles", joined.clone())],
            )
            .await?;

        let pages: Vec<WikipediaPageFull> = res
            .query
            .unwrap_or_default()
            .pages
            .into_iter()
            .filter(|p| p.exists())
            .map(|p| {
                // MediaWiki returns a full-text extract for one page per batch;
                // the others come back without the field.
                let mut full = WikipediaPageFull::new(self.page(p.pageid.unwrap_or_default(), &p.title));
                full.extract = p.extract;
                full
            })
            .collect();

        if pages.is_empty() {
            return Err(WikiError::NotFound(joined));
        }
        Ok(pages)
    }

    async fn prefix_search(&self, prefix: &str, limit: Option<u32>) -> WikiResult<Vec<WikipediaPage>> {
        let limit = self.effective_limit(limit);
        let res = self
            .call(
                "query",
                &[
                    ("generator", "prefixsearch".to_string()),
                    ("prop", "pageprops|pageimages|description".to_string()),
                    ("ppprop", "displaytitle".to_string()),
                    ("gpssearch", prefix.to_string()),
                    ("gpsnamespace", "0".to_string()),
                    ("gpslimit", limit.to_string()),
                ],
            )
            .await?;

        let mut pages: Vec<_> = res
            .query
            .unwrap_or_default()
            .pages
            .into_iter()
            .filter(|p| p.exists())
            .collect();
        pages.sort_by_key(|p| p.index.unwrap_or(u32::MAX));

        Ok(pages
            .iter()
            .map(|p| self.page(p.pageid.unwrap_or_default(), &p.title))
            .collect())
    }

    async fn categories(&self, page_id: u64) -> WikiResult<WikipediaPageFull> {
        let parse = self.parse(page_id, "categories").await?;
        let mut page = self.parse_page(&parse);
        page.categories = Some(parse.category_names());
        Ok(page)
    }

    async fn sections(&self, page_id: u64) -> WikiResult<WikipediaPageFull> {
        let parse = self.parse(page_id, "sections").await?;
        let mut page = self.parse_page(&parse);
        page.sections = Some(parse.section_anchors());
        Ok(page)
    }
}

impl std::fmt::Debug for WikipediaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikipediaClient")
            .field("api_url", &self.api_url.as_str())
            .field("default_search_limit", &self.default_search_limit)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
