//! Page fetching.
//!
//! Every listing and detail page goes through [`Fetcher::get`]: cache lookup,
//! rate limiting, GET with retry on transient failures, body size check, then
//! the body is cached for the rest of the run.

mod cache;
mod retry;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio_retry::RetryIf;

use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::{get_retry_strategy, update_error_stats, InfoType, ProcessingStats};
use crate::initialization::RateLimiter;

pub use cache::ResponseCache;
pub(crate) use retry::is_retriable_error;

/// Fetch failures that are not transport errors.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Response body of {url} is {size} bytes, over the limit")]
    BodyTooLarge { url: String, size: usize },
}

/// Applies browser-like request headers.
///
/// The catalog serves the same markup to any client that sends these.
fn apply_browser_headers(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-GB,en;q=0.9")
        .header(reqwest::header::CACHE_CONTROL, "max-age=0")
}

/// Shared HTTP GET front end for the crawl.
pub struct Fetcher {
    client: Arc<reqwest::Client>,
    cache: Arc<ResponseCache>,
    rate_limiter: Option<Arc<RateLimiter>>,
    retry_initial_delay_ms: u64,
    stats: Arc<ProcessingStats>,
}

impl Fetcher {
    pub fn new(
        client: Arc<reqwest::Client>,
        cache: Arc<ResponseCache>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            client,
            cache,
            rate_limiter: None,
            retry_initial_delay_ms: crate::config::RETRY_INITIAL_DELAY_MS,
            stats,
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Option<Arc<RateLimiter>>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_retry_delay(mut self, initial_delay_ms: u64) -> Self {
        self.retry_initial_delay_ms = initial_delay_ms;
        self
    }

    /// Returns the body of `url`.
    ///
    /// Served from the cache when the same URL was fetched before. Otherwise
    /// transient failures (timeouts, connection errors, 429, 5xx) are retried
    /// with exponential backoff; anything else fails on the first attempt.
    /// Only successful bodies are cached.
    ///
    /// # Errors
    ///
    /// The last attempt's error, with its HTTP category already counted.
    pub async fn get(&self, url: &str) -> Result<Arc<str>> {
        if let Some(body) = self.cache.get(url).await {
            log::debug!("Cache hit for {}", url);
            self.stats.increment_info(InfoType::CacheHit);
            return Ok(body);
        }

        let attempts = AtomicUsize::new(0);
        let result = RetryIf::spawn(
            get_retry_strategy(self.retry_initial_delay_ms),
            || {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed);
                if attempt > 0 {
                    log::debug!("Retrying {} (attempt {})", url, attempt + 1);
                    self.stats.increment_info(InfoType::RetryAttempt);
                }
                self.attempt(url)
            },
            |e: &anyhow::Error| is_retriable_error(e),
        )
        .await;

        match result {
            Ok(body) => {
                self.cache.put(url, Arc::clone(&body)).await;
                Ok(body)
            }
            Err(e) => {
                update_error_stats(&self.stats, &e);
                Err(e)
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<Arc<str>> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let response = apply_browser_headers(self.client.get(url))
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .context("Server returned an error status")?;

        if let Some(len) = response.content_length() {
            let size = usize::try_from(len).unwrap_or(usize::MAX);
            if size > MAX_RESPONSE_BODY_SIZE {
                return Err(FetchError::BodyTooLarge {
                    url: url.to_string(),
                    size,
                }
                .into());
            }
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read response body")?;
        if bytes.len() > MAX_RESPONSE_BODY_SIZE {
            return Err(FetchError::BodyTooLarge {
                url: url.to_string(),
                size: bytes.len(),
            }
            .into());
        }

        Ok(Arc::from(String::from_utf8_lossy(&bytes).into_owned()))
    }
}
