//! IP geolocation client.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::domain::Coordinate;
use crate::error::{LocateError, Provider, UpstreamError};
use crate::json::{LooseNumber, from_object, required_f64};
use crate::upstream::{BuildError, DEFAULT_TIMEOUT_SECS, RetryPolicy, UpstreamClient};

/// Default lookup endpoint; the client address is appended as a path segment.
pub const DEFAULT_BASE_URL: &str = "http://ip-api.com/json/";

/// Lookup response. Only the coordinate and failure status are read.
#[derive(Debug, Deserialize)]
pub struct GeoResponse {
    /// `"success"` or `"fail"` on ip-api; absent on other providers
    pub status: Option<String>,
    /// Failure reason when `status` is `"fail"`
    pub message: Option<String>,
    pub lat: Option<LooseNumber>,
    pub lon: Option<LooseNumber>,
}

/// Configuration for the geolocation client.
#[derive(Debug, Clone)]
pub struct GeoResolverConfig {
    /// Base URL the client address is appended to
    pub base_url: Url,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// Reject coordinates outside [-90, 90] x [-180, 180]
    pub strict_bounds: bool,
}

impl GeoResolverConfig {
    /// Create a config for the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            strict_bounds: false,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable strict coordinate bounds.
    pub fn with_strict_bounds(mut self, strict: bool) -> Self {
        self.strict_bounds = strict;
        self
    }
}

/// Resolves client network addresses to coordinates.
#[derive(Debug, Clone)]
pub struct GeoResolver {
    upstream: UpstreamClient,
    base_url: Url,
    strict_bounds: bool,
}

impl GeoResolver {
    /// Create a new resolver.
    pub fn new(config: GeoResolverConfig) -> Result<Self, BuildError> {
        if config.base_url.cannot_be_a_base() {
            return Err(BuildError::BaseUrl(config.base_url));
        }

        let upstream = UpstreamClient::new(
            Provider::GeoIp,
            Duration::from_secs(config.timeout_secs),
            config.retry,
        )?;

        Ok(Self {
            upstream,
            base_url: config.base_url,
            strict_bounds: config.strict_bounds,
        })
    }

    /// Look up the coordinate of `client_address`.
    pub async fn resolve(&self, client_address: &str) -> Result<Coordinate, LocateError> {
        let url = lookup_url(&self.base_url, client_address);
        let body = self.upstream.get_text(url).await?;
        parse_response(&body, self.strict_bounds)
    }
}

/// Append `client_address` to `base` as a single percent-encoded segment.
fn lookup_url(base: &Url, client_address: &str) -> Url {
    let mut url = base.clone();
    // `GeoResolver::new` rejects URLs without a path.
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(client_address);
    }
    url
}

/// Parse a lookup response body into a coordinate.
pub fn parse_response(body: &str, strict_bounds: bool) -> Result<Coordinate, LocateError> {
    let provider = Provider::GeoIp;
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LocateError::malformed(provider, e.to_string()))?;
    let response: GeoResponse =
        from_object(value).map_err(|m| LocateError::malformed(provider, m))?;

    if response.status.as_deref() == Some("fail") {
        return Err(UpstreamError::Rejected {
            provider,
            message: response
                .message
                .unwrap_or_else(|| "no reason given".to_string()),
        }
        .into());
    }

    let lat = required_f64("lat", response.lat.as_ref())
        .map_err(|m| LocateError::malformed(provider, m))?;
    let lon = required_f64("lon", response.lon.as_ref())
        .map_err(|m| LocateError::malformed(provider, m))?;

    let coordinate = if strict_bounds {
        Coordinate::new_bounded(lat, lon)?
    } else {
        Coordinate::new(lat, lon)?
    };
    Ok(coordinate)
}
