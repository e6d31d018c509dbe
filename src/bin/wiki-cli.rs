use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "wiki-cli")]
#[command(about = "Command-line client for the Wikipedia gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch extracts for one or more titles (separate with '|')
    Extracts { titles: String },
    /// Prefix search on article titles
    Search {
        value: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List the categories of an article
    Categories { pageid: u64 },
    /// List the section anchors of an article
    Sections { pageid: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let request = match cli.command {
        Commands::Extracts { titles } => {
            client.get(endpoint(&cli.url, &["extracts", titles.as_str()])?)
        }
        Commands::Search { value, limit } => {
            let req = client.get(endpoint(&cli.url, &["search", value.as_str()])?);
            match limit {
                Some(limit) => req.query(&[("limit", limit)]),
                None => req,
            }
        }
        Commands::Categories { pageid } => {
            client.get(endpoint(&cli.url, &["categories", pageid.to_string().as_str()])?)
        }
        Commands::Sections { pageid } => {
            client.get(endpoint(&cli.url, &["sections", pageid.to_string().as_str()])?)
        }
    };

    print_response(request.send().await?).await
}

/// Gateway URL for an API route; segments are percent-encoded.
fn endpoint(base: &str, segments: &[&str]) -> Result<url::Url, Box<dyn std::error::Error>> {
    let mut url = url::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("{} cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(["api", "v1.0"])
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("gateway returned status {}", status).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        axum::http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_error_status_fails_command() {
        let res = response(404, r#"{"status":404,"message":"not found: page id 0"}"#);
        let err = print_response(res).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_success_prints_json() {
        let res = response(200, r#"[{"id":1,"title":"Rust","url":"https://en.wikipedia.org/wiki/Rust"}]"#);
        assert!(print_response(res).await.is_ok());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("http://localhost:3000", &["extracts", "Rust|Go lang"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v1.0/extracts/Rust%7CGo%20lang");
    }
}
