//! Reqwest client with response cache and retry.

use std::time::Duration;

use async_trait::async_trait;

use super::cache::ResponseCache;
use super::retry::RetryPolicy;
use super::{Fetch, FetchError};
use crate::config::TransportConfig;

const USER_AGENT: &str = concat!("mensaboard/", env!("CARGO_PKG_VERSION"));

/// HTTP client used by the dashboard.
///
/// Successful bodies are cached per URL for `ttl`; transient failures are
/// retried according to the [`RetryPolicy`].
#[derive(Debug)]
pub struct CachedClient {
    client: reqwest::Client,
    cache: Option<ResponseCache>,
    ttl: Duration,
    retry: RetryPolicy,
}

impl CachedClient {
    pub fn new(cache: Option<ResponseCache>, ttl: Duration, retry: RetryPolicy) -> Self {
        Self::with_timeout(cache, ttl, retry, Duration::from_secs(15))
    }

    pub fn with_timeout(
        cache: Option<ResponseCache>,
        ttl: Duration,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            cache,
            ttl,
            retry,
        }
    }

    /// Client without a cache (every call hits the network).
    pub fn uncached(retry: RetryPolicy) -> Self {
        Self::new(None, Duration::ZERO, retry)
    }

    /// Build from config; cache open failures downgrade to an uncached client.
    pub fn from_config(config: &TransportConfig, cache_path: &std::path::Path) -> Self {
        let cache = match ResponseCache::open(cache_path) {
            Ok(cache) => Some(cache),
            Err(e) => {
                log::warn!(
                    "Response cache at {} unavailable, continuing without: {}",
                    cache_path.display(),
                    e
                );
                None
            }
        };
        Self::with_timeout(
            cache,
            Duration::from_secs(config.ttl_secs),
            RetryPolicy {
                retries: config.retries,
                backoff_factor: config.backoff_factor,
            },
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let mut retry = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if retry < self.retry.retries && is_transient(&e) => {
                    retry += 1;
                    let delay = self.retry.delay(retry);
                    log::warn!(
                        "GET {} failed ({}), retry {}/{} in {:?}",
                        url,
                        e,
                        retry,
                        self.retry.retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => RetryPolicy::should_retry_error(e),
        FetchError::Status { status, .. } => RetryPolicy::should_retry_status(*status),
        _ => false,
    }
}

#[async_trait]
impl Fetch for CachedClient {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        if let Some(cache) = &self.cache {
            match cache.get(url, self.ttl) {
                Ok(Some(body)) => {
                    log::debug!("cache hit: {}", url);
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => log::warn!("cache read failed for {}: {}", url, e),
            }
        }

        log::debug!("GET {}", url);
        let body = self.fetch_with_retry(url).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url, &body) {
                log::warn!("cache write failed for {}: {}", url, e);
            }
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let status = |s| FetchError::Status {
            url: "u".into(),
            status: s,
            message: String::new(),
        };
        assert!(is_transient(&status(503)));
        assert!(!is_transient(&status(404)));
        assert!(!is_transient(&FetchError::Other("x".into())));
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let cache = ResponseCache::in_memory().unwrap();
        // Unroutable URL: only the cache can answer it
        let url = "http://127.0.0.1:9/never";
        cache.put(url, "cached").unwrap();

        let client = CachedClient::new(
            Some(cache),
            Duration::from_secs(3600),
            RetryPolicy::none(),
        );
        assert_eq!(client.get_text(url).await.unwrap(), "cached");
    }
}
