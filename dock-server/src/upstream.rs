//! Shared HTTP plumbing for the upstream providers.
//!
//! Both providers are plain `GET` endpoints returning JSON. This module
//! owns the `reqwest` client, the per-request timeout and the bounded
//! retry on transient failures. Parsing is left to the callers, so a
//! malformed body is never retried.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::error::{Provider, UpstreamError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Longest error body kept in an [`UpstreamError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Errors constructing a provider client.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The HTTP client could not be created
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured URL cannot have path segments appended
    #[error("{0} cannot be used as a base URL")]
    BaseUrl(Url),
}

/// Retry settings for upstream fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given retry count and default delays.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// HTTP client bound to one provider.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    provider: Provider,
    retry: RetryPolicy,
}

impl UpstreamClient {
    /// Create a client with an explicit timeout.
    pub fn new(
        provider: Provider,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, BuildError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            provider,
            retry,
        })
    }

    /// The provider this client talks to.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Fetch `url` and return the response body, retrying transient failures.
    pub async fn get_text(&self, url: Url) -> Result<String, UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.get_text_once(url.clone()).await {
                Ok(body) => {
                    if attempt > 0 {
                        debug!(provider = %self.provider, attempt, "succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        provider = %self.provider,
                        "request failed (attempt {}/{}): {}; retrying in {} ms",
                        attempt,
                        self.retry.max_retries + 1,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_text_once(&self, url: Url) -> Result<String, UpstreamError> {
        let provider = self.provider;
        debug!(%provider, %url, "fetching");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Http { provider, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                provider,
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| UpstreamError::Http { provider, source })
    }
}
