//! Shared utilities for integration testing: a mock MediaWiki backend and a
//! gateway bound to an ephemeral port.

use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use wiki_gateway::{GatewayConfig, HttpServer, Shutdown};

/// Page id the mock knows about for `action=parse`.
pub const KNOWN_PAGE_ID: u64 = 25039;

/// Total titles the mock prefix search can return.
pub const MOCK_SEARCH_POOL: u32 = 60;

/// Start a mock `api.php` and return its address.
pub async fn start_mock_wiki() -> SocketAddr {
    let app = Router::new().route("/w/api.php", get(mock_api));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn mock_api(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let body = match (param(&params, "action"), param(&params, "generator")) {
        ("query", "prefixsearch") => {
            prefix_search(param(&params, "gpssearch"), param(&params, "gpslimit"))
        }
        ("query", _) => extracts(param(&params, "titles")),
        ("parse", _) => parse(param(&params, "pageid"), param(&params, "prop")),
        _ => json!({"error": {"code": "badvalue", "info": "Unrecognized value for parameter \"action\"."}}),
    };
    Json(body)
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or_default()
}

fn extracts(titles: &str) -> Value {
    let pages: Vec<Value> = titles
        .split('|')
        .enumerate()
        .map(|(i, title)| {
            if title.starts_with("Missing") {
                json!({"ns": 0, "title": title, "missing": true})
            } else if i > 0 {
                // Full-text extracts are only served for the first page.
                json!({"pageid": 1000 + i, "ns": 0, "title": title})
            } else {
                json!({
                    "pageid": 1000 + i,
                    "ns": 0,
                    "title": title,
                    "extract": format!("<p><b>{}</b> is an article.</p>", title),
                })
            }
        })
        .collect();
    json!({"batchcomplete": true, "query": {"pages": pages}})
}

fn prefix_search(prefix: &str, limit: &str) -> Value {
    if prefix == "zzzz" {
        return json!({"batchcomplete": true});
    }

    let limit: u32 = limit.parse().unwrap_or(10).min(MOCK_SEARCH_POOL);
    // Reverse rank order so the gateway has to sort by `index`.
    let pages: Vec<Value> = (1..=limit)
        .rev()
        .map(|i| json!({"pageid": i, "ns": 0, "title": format!("{} {}", prefix, i), "index": i}))
        .collect();
    json!({"batchcomplete": true, "query": {"pages": pages}})
}

fn parse(pageid: &str, prop: &str) -> Value {
    if pageid != KNOWN_PAGE_ID.to_string() {
        return json!({"error": {
            "code": "nosuchpageid",
            "info": format!("There is no page with ID {}.", pageid),
        }});
    }

    let mut parse = json!({"title": "Rust (programming language)", "pageid": KNOWN_PAGE_ID});
    match prop {
        "categories" => {
            parse["categories"] = json!([
                {"sortkey": "", "category": "Programming_languages"},
                {"sortkey": "", "category": "Articles_with_short_description", "hidden": true},
            ]);
        }
        "sections" => {
            parse["sections"] = json!([
                {"toclevel": 1, "level": "2", "line": "History", "number": "1", "index": "1", "anchor": "History"},
                {"toclevel": 1, "level": "2", "line": "Syntax and features", "number": "2", "index": "2", "anchor": "Syntax_and_features"},
            ]);
        }
        _ => {}
    }
    json!({"parse": parse})
}

/// Start a gateway whose upstream is `api_url`. Returns its address and the
/// shutdown handle that stops it.
pub async fn start_gateway(api_url: String) -> (SocketAddr, Shutdown) {
    start_gateway_with(gateway_config(api_url)).await
}

/// Test configuration pointing at `api_url`, with short upstream timeouts.
pub fn gateway_config(api_url: String) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.upstream.api_url = api_url;
    config.upstream.timeout_secs = 2;
    config.upstream.connect_timeout_secs = 1;
    config
}

pub async fn start_gateway_with(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Upstream that accepts connections and never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}

/// Gateway backed by a fresh mock MediaWiki.
pub async fn start_stack() -> (String, Shutdown) {
    let wiki = start_mock_wiki().await;
    let (addr, shutdown) = start_gateway(format!("http://{}/w/api.php", wiki)).await;
    (format!("http://{}", addr), shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
