//! Error types for locating the nearest station.

use std::fmt;

use crate::domain::InvalidCoordinate;
use crate::nearest::EmptyCatalog;

/// The external service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// IP geolocation API
    GeoIp,
    /// Bike-share station feed
    StationFeed,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::GeoIp => f.write_str("geoip"),
            Provider::StationFeed => f.write_str("station feed"),
        }
    }
}

/// A failure talking to an upstream provider.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Transport failure (connect error, timeout, truncated body)
    #[error("{provider} request failed: {source}")]
    Http {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// Provider answered but declared the lookup failed
    #[error("{provider} rejected the lookup: {message}")]
    Rejected { provider: Provider, message: String },
}

impl UpstreamError {
    /// Which provider failed.
    pub fn provider(&self) -> Provider {
        match self {
            UpstreamError::Http { provider, .. }
            | UpstreamError::Status { provider, .. }
            | UpstreamError::Rejected { provider, .. } => *provider,
        }
    }

    /// Whether a retry might succeed.
    ///
    /// Connect errors, timeouts and 5xx statuses are transient; everything
    /// else is answered the same way on a second attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Http { source, .. } => source.is_connect() || source.is_timeout(),
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::Rejected { .. } => false,
        }
    }
}

/// Errors from locating the station nearest to a client.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// Network or HTTP failure talking to a provider
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Response did not match the expected schema
    #[error("malformed {provider} response: {message}")]
    MalformedResponse { provider: Provider, message: String },

    /// No stations to compare against
    #[error(transparent)]
    EmptyCatalog(#[from] EmptyCatalog),

    /// Latitude/longitude unusable on either side
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
}

impl LocateError {
    pub(crate) fn malformed(provider: Provider, message: impl Into<String>) -> Self {
        LocateError::MalformedResponse {
            provider,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LocateError::malformed(Provider::StationFeed, "missing `stationBeanList`");
        assert_eq!(
            err.to_string(),
            "malformed station feed response: missing `stationBeanList`"
        );

        let err = LocateError::from(UpstreamError::Status {
            provider: Provider::GeoIp,
            status: 503,
            body: "busy".into(),
        });
        assert_eq!(err.to_string(), "geoip returned HTTP 503: busy");

        let err = LocateError::from(EmptyCatalog);
        assert_eq!(err.to_string(), "station feed contained no stations");
    }

    #[test]
    fn status_transience() {
        let server_error = UpstreamError::Status {
            provider: Provider::StationFeed,
            status: 502,
            body: String::new(),
        };
        assert!(server_error.is_transient());

        let not_found = UpstreamError::Status {
            provider: Provider::StationFeed,
            status: 404,
            body: String::new(),
        };
        assert!(!not_found.is_transient());

        let rejected = UpstreamError::Rejected {
            provider: Provider::GeoIp,
            message: "private range".into(),
        };
        assert!(!rejected.is_transient());
        assert_eq!(rejected.provider(), Provider::GeoIp);
    }
}
