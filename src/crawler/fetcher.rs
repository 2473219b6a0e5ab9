//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Bounded retry with exponential backoff on transient statuses
//! - Classification of every other failure as terminal

use crate::config::{Config, FetcherConfig};
use crate::{FetchError, FetchResult};
use rand::Rng;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Page body content
    pub body: String,
    /// Number of requests the fetch took
    pub attempts: u32,
}

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `CrawlerName/Version (contact: email)`.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.fetcher.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for statuses that mean "try again later"
///
/// Rate limiting and upstream unavailability are retried; every other
/// non-success status is final.
pub fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            unit: Duration::from_millis(config.backoff_unit_ms),
        }
    }

    /// Lower bound of the wait after failed attempt `attempt` (0-indexed)
    pub fn min_backoff(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(1u32 << attempt.min(16))
    }

    /// Wait after failed attempt `attempt`: `2^attempt` units plus up to one
    /// unit of random jitter
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let unit_ms = self.unit.as_millis() as u64;
        let jitter = if unit_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..unit_ms)
        };
        self.min_backoff(attempt) + Duration::from_millis(jitter)
    }
}

/// Performs single logical page fetches with bounded retry
///
/// No caching: fetching the same URL twice always hits the network twice.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds a fetcher from the full configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            RetryPolicy::from_config(&config.fetcher),
        ))
    }

    /// Fetches `url`, retrying transient statuses with backoff
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the page |
    /// | 429, 502, 503, 504 | Back off and retry, up to `max_attempts` |
    /// | Other status | Immediate `Terminal` |
    /// | Network error | Immediate `Network` |
    ///
    /// When every attempt was transient the last status is returned as
    /// `Exhausted`. There is no wait after the final attempt.
    pub async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let mut attempt = 0;

        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();

            if status.is_success() {
                let final_url = response.url().to_string();
                let body = response.text().await.map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                })?;

                return Ok(FetchedPage {
                    url: final_url,
                    status: status.as_u16(),
                    body,
                    attempts: attempt + 1,
                });
            }

            if !is_transient(status) {
                return Err(FetchError::Terminal {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            if attempt + 1 >= self.policy.max_attempts {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    status: status.as_u16(),
                    attempts: attempt + 1,
                });
            }

            let delay = self.policy.backoff_delay(attempt);
            tracing::warn!(
                "HTTP {} for {}, retrying in {:?} (attempt {}/{})",
                status.as_u16(),
                url,
                delay,
                attempt + 1,
                self.policy.max_attempts
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
