//! MediaWiki action API wire model (`format=json&formatversion=2`).
//!
//! Only the fields the gateway reads are modelled; everything else in the
//! upstream body is ignored.

use serde::Deserialize;

use crate::wiki::types::WikiError;

/// Top-level body of any `api.php` answer.
#[derive(Debug, Deserialize, Default)]
pub struct ApiResponse {
    #[serde(default)]
    pub query: Option<QueryBody>,
    #[serde(default)]
    pub parse: Option<ParseBody>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl ApiResponse {
    /// Turn an embedded `error` object into an `Err`.
    pub fn into_result(self) -> Result<Self, WikiError> {
        match self.error {
            Some(err) => Err(WikiError::Api {
                code: err.code,
                info: err.info,
            }),
            None => Ok(self),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct QueryBody {
    #[serde(default)]
    pub pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub pageid: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub extract: Option<String>,
    /// Rank within a generator result (prefix search).
    #[serde(default)]
    pub index: Option<u32>,
}

impl ApiPage {
    /// Pages that exist upstream carry a page id and no missing/invalid flag.
    pub fn exists(&self) -> bool {
        !self.missing && !self.invalid && self.pageid.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct ParseBody {
    pub pageid: u64,
    pub title: String,
    #[serde(default)]
    pub categories: Vec<ApiCategory>,
    #[serde(default)]
    pub sections: Vec<ApiSection>,
}

impl ParseBody {
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.category.clone()).collect()
    }

    pub fn section_anchors(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.anchor.clone()).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiCategory {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSection {
    pub anchor: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pages_with_missing_entry() {
        let body: ApiResponse = serde_json::from_str(
            r#"{
                "batchcomplete": true,
                "query": {
                    "pages": [
                        {"pageid": 25039, "ns": 0, "title": "Rust", "extract": "<p>Rust is...</p>"},
                        {"ns": 0, "title": "Nonexistent page", "missing": true}
                    ]
                }
            }"#,
        )
        .unwrap();

        let pages = body.into_result().unwrap().query.unwrap().pages;
        assert_eq!(pages.len(), 2);
        assert!(pages[0].exists());
        assert_eq!(pages[0].extract.as_deref(), Some("<p>Rust is...</p>"));
        assert!(!pages[1].exists());
    }

    #[test]
    fn test_parse_flattening() {
        let body: ApiResponse = serde_json::from_str(
            r#"{
                "parse": {
                    "title": "Tokio",
                    "pageid": 42,
                    "categories": [
                        {"sortkey": "", "category": "Rust_libraries"},
                        {"sortkey": "", "category": "Articles_with_short_description", "hidden": true}
                    ],
                    "sections": [
                        {"toclevel": 1, "level": "2", "line": "History", "number": "1", "index": "1", "anchor": "History", "linkAnchor": "History"},
                        {"toclevel": 1, "level": "2", "line": "See also", "number": "2", "index": "2", "anchor": "See_also", "linkAnchor": "See_also"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let parse = body.parse.unwrap();
        assert_eq!(parse.pageid, 42);
        assert_eq!(
            parse.category_names(),
            vec!["Rust_libraries", "Articles_with_short_description"]
        );
        assert_eq!(parse.section_anchors(), vec!["History", "See_also"]);
    }

    #[test]
    fn test_error_object_becomes_err() {
        let body: ApiResponse = serde_json::from_str(
            r#"{"error": {"code": "nosuchpageid", "info": "There is no page with ID 0.", "docref": "..."}}"#,
        )
        .unwrap();

        let err = body.into_result().unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("There is no page with ID 0."));
    }
}
