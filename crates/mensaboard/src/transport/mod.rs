//! HTTP transport shared by the menu and forecast pipelines.
//!
//! Pipelines only see the [`Fetch`] trait. [`CachedClient`] is the real
//! implementation: reqwest with a SQLite response cache and bounded
//! exponential-backoff retry.

pub mod cache;
pub mod client;
pub mod retry;

use async_trait::async_trait;

pub use cache::{CacheError, ResponseCache};
pub use client::CachedClient;
pub use retry::RetryPolicy;

/// Errors from fetching a document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Source of response bodies, injected into the pipelines.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` and return the body of a successful response.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// GET `url` and parse the body as JSON.
pub async fn fetch_json<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<serde_json::Value, FetchError> {
    let body = fetcher.get_text(url).await?;
    serde_json::from_str(&body).map_err(|source| FetchError::Json {
        url: url.to_string(),
        source,
    })
}

/// Canned responses keyed by URL, for tests and offline demos.
#[derive(Debug, Default, Clone)]
pub struct StaticFetcher {
    responses: std::collections::HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
                message: "no canned response".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_json_parses_body() {
        let fetcher = StaticFetcher::new().with("http://x/a", r#"{"meals": []}"#);
        let value = fetch_json(&fetcher, "http://x/a").await.unwrap();
        assert!(value["meals"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_json_reports_malformed_body() {
        let fetcher = StaticFetcher::new().with("http://x/a", "<html>oops</html>");
        let err = fetch_json(&fetcher, "http://x/a").await.unwrap_err();
        match err {
            FetchError::Json { url, .. } => assert_eq!(url, "http://x/a"),
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn static_fetcher_unknown_url_is_404() {
        let err = StaticFetcher::new().get_text("http://x/b").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
