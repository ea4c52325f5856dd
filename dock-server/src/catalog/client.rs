//! Bike-share station feed client.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::domain::{Coordinate, StationRecord};
use crate::error::{LocateError, Provider};
use crate::json::{LooseNumber, from_object, optional_count, required_f64};
use crate::upstream::{BuildError, DEFAULT_TIMEOUT_SECS, RetryPolicy, UpstreamClient};

/// Default station feed URL.
pub const DEFAULT_FEED_URL: &str = "http://citibikenyc.com/stations/json";

/// Top-level feed document. Everything but the station list is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationFeed {
    pub station_bean_list: Option<Vec<serde_json::Value>>,
}

/// One entry of `stationBeanList`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationBean {
    pub latitude: Option<LooseNumber>,
    pub longitude: Option<LooseNumber>,
    #[serde(rename = "stAddress1")]
    pub st_address1: Option<String>,
    pub id: Option<serde_json::Value>,
    pub station_name: Option<serde_json::Value>,
    pub available_bikes: Option<serde_json::Value>,
    pub available_docks: Option<serde_json::Value>,
}

/// Configuration for the station feed client.
#[derive(Debug, Clone)]
pub struct StationCatalogConfig {
    /// Feed URL
    pub feed_url: Url,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// Reject coordinates outside [-90, 90] x [-180, 180]
    pub strict_bounds: bool,
}

impl StationCatalogConfig {
    /// Create a config for the given feed URL.
    pub fn new(feed_url: Url) -> Self {
        Self {
            feed_url,
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

/// Fetches the current station list.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    upstream: UpstreamClient,
    feed_url: Url,
    strict_bounds: bool,
}

impl StationCatalog {
    /// Create a new catalog client.
    pub fn new(config: StationCatalogConfig) -> Result<Self, BuildError> {
        let upstream = UpstreamClient::new(
            Provider::StationFeed,
            Duration::from_secs(config.timeout_secs),
            config.retry,
        )?;

        Ok(Self {
            upstream,
            feed_url: config.feed_url,
            strict_bounds: config.strict_bounds,
        })
    }

    /// Fetch every station currently in the feed.
    ///
    /// An empty `stationBeanList` is returned as an empty list; a missing
    /// one is a [`LocateError::MalformedResponse`].
    pub async fn fetch_stations(&self) -> Result<Vec<StationRecord>, LocateError> {
        let body = self.upstream.get_text(self.feed_url.clone()).await?;
        parse_feed(&body, self.strict_bounds)
    }
}

/// Parse a feed body into station records.
///
/// Every entry must carry a numeric `latitude`/`longitude` and a string
/// `stAddress1`; the first entry that does not fails the whole feed.
pub fn parse_feed(body: &str, strict_bounds: bool) -> Result<Vec<StationRecord>, LocateError> {
    let provider = Provider::StationFeed;
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LocateError::malformed(provider, e.to_string()))?;
    let feed: StationFeed =
        from_object(value).map_err(|m| LocateError::malformed(provider, m))?;

    let beans = feed
        .station_bean_list
        .ok_or_else(|| LocateError::malformed(provider, "missing `stationBeanList`"))?;

    beans
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            parse_station(value, strict_bounds).map_err(|e| match e {
                LocateError::MalformedResponse { provider, message } => {
                    LocateError::MalformedResponse {
                        provider,
                        message: format!("station {index}: {message}"),
                    }
                }
                other => other,
            })
        })
        .collect()
}

fn parse_station(
    value: serde_json::Value,
    strict_bounds: bool,
) -> Result<StationRecord, LocateError> {
    let provider = Provider::StationFeed;
    let bean: StationBean =
        from_object(value).map_err(|m| LocateError::malformed(provider, m))?;

    let lat = required_f64("latitude", bean.latitude.as_ref())
        .map_err(|m| LocateError::malformed(provider, m))?;
    let lon = required_f64("longitude", bean.longitude.as_ref())
        .map_err(|m| LocateError::malformed(provider, m))?;
    let address = bean
        .st_address1
        .ok_or_else(|| LocateError::malformed(provider, "missing `stAddress1`"))?;

    let coordinate = if strict_bounds {
        Coordinate::new_bounded(lat, lon)?
    } else {
        Coordinate::new(lat, lon)?
    };

    Ok(StationRecord {
        coordinate,
        address,
        id: bean.id.as_ref().and_then(serde_json::Value::as_i64),
        name: bean
            .station_name
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        available_bikes: optional_count(bean.available_bikes.as_ref()),
        available_docks: optional_count(bean.available_docks.as_ref()),
    })
}
