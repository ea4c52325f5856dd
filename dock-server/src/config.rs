//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::Url;

use crate::catalog::{DEFAULT_FEED_URL, StationCatalogConfig};
use crate::geoip::{DEFAULT_BASE_URL, GeoResolverConfig};
use crate::upstream::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, RetryPolicy};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default directory for static assets.
pub const DEFAULT_STATIC_DIR: &str = "dock-server/static";

pub const ENV_BIND_ADDR: &str = "DOCK_BIND_ADDR";
pub const ENV_GEOIP_URL: &str = "DOCK_GEOIP_URL";
pub const ENV_STATION_FEED_URL: &str = "DOCK_STATION_FEED_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "DOCK_HTTP_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "DOCK_MAX_RETRIES";
pub const ENV_TRUST_FORWARDED_FOR: &str = "DOCK_TRUST_FORWARDED_FOR";
pub const ENV_STRICT_BOUNDS: &str = "DOCK_STRICT_BOUNDS";
pub const ENV_STATIC_DIR: &str = "DOCK_STATIC_DIR";

/// Errors reading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// IP geolocation base URL
    pub geoip_url: Url,
    /// Station feed URL
    pub station_feed_url: Url,
    /// Per-request timeout for upstream fetches, in seconds
    pub http_timeout_secs: u64,
    /// Retries on transient upstream failures
    pub max_retries: u32,
    /// Take the client address from `X-Forwarded-For`
    pub trust_forwarded_for: bool,
    /// Reject coordinates outside [-90, 90] x [-180, 180]
    pub strict_bounds: bool,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`, using defaults for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str, default: &str| -> (&'static str, String) {
            let value = lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string());
            (var, value)
        };

        let bind_addr = parse_with(get(ENV_BIND_ADDR, DEFAULT_BIND_ADDR), |v| {
            v.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;
        let geoip_url = parse_with(get(ENV_GEOIP_URL, DEFAULT_BASE_URL), parse_base_url)?;
        let station_feed_url =
            parse_with(get(ENV_STATION_FEED_URL, DEFAULT_FEED_URL), parse_http_url)?;
        let http_timeout_secs = parse_with(
            get(ENV_HTTP_TIMEOUT_SECS, &DEFAULT_TIMEOUT_SECS.to_string()),
            |v| match v.parse::<u64>() {
                Ok(0) => Err("must be at least 1".to_string()),
                Ok(n) => Ok(n),
                Err(e) => Err(e.to_string()),
            },
        )?;
        let max_retries = parse_with(
            get(ENV_MAX_RETRIES, &DEFAULT_MAX_RETRIES.to_string()),
            |v| v.parse::<u32>().map_err(|e| e.to_string()),
        )?;
        let trust_forwarded_for = parse_with(get(ENV_TRUST_FORWARDED_FOR, "false"), parse_bool)?;
        let strict_bounds = parse_with(get(ENV_STRICT_BOUNDS, "false"), parse_bool)?;
        let (_, static_dir) = get(ENV_STATIC_DIR, DEFAULT_STATIC_DIR);

        Ok(Self {
            bind_addr,
            geoip_url,
            station_feed_url,
            http_timeout_secs,
            max_retries,
            trust_forwarded_for,
            strict_bounds,
            static_dir: PathBuf::from(static_dir),
        })
    }

    /// Client configuration for the geolocation provider.
    pub fn geo_resolver(&self) -> GeoResolverConfig {
        GeoResolverConfig::new(self.geoip_url.clone())
            .with_timeout(self.http_timeout_secs)
            .with_retry(RetryPolicy::new(self.max_retries))
            .with_strict_bounds(self.strict_bounds)
    }

    /// Client configuration for the station feed.
    pub fn station_catalog(&self) -> StationCatalogConfig {
        StationCatalogConfig::new(self.station_feed_url.clone())
            .with_timeout(self.http_timeout_secs)
            .with_retry(RetryPolicy::new(self.max_retries))
            .with_strict_bounds(self.strict_bounds)
    }
}

fn parse_with<T>(
    (var, value): (&'static str, String),
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    parse(&value).map_err(|reason| ConfigError::Invalid {
        var,
        value,
        reason,
    })
}

fn parse_http_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme `{other}`")),
    }
}

fn parse_base_url(value: &str) -> Result<Url, String> {
    let url = parse_http_url(value)?;
    if url.query().is_some() {
        return Err("base URL must not have a query string".to_string());
    }
    Ok(url)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.geoip_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.station_feed_url.as_str(), DEFAULT_FEED_URL);
        assert_eq!(config.http_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!config.trust_forwarded_for);
        assert!(!config.strict_bounds);
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            (ENV_BIND_ADDR, "0.0.0.0:8080"),
            (ENV_GEOIP_URL, "https://geo.example.com/json/"),
            (ENV_STATION_FEED_URL, "https://feed.example.com/stations.json"),
            (ENV_HTTP_TIMEOUT_SECS, "2"),
            (ENV_MAX_RETRIES, "0"),
            (ENV_TRUST_FORWARDED_FOR, "yes"),
            (ENV_STRICT_BOUNDS, "TRUE"),
            (ENV_STATIC_DIR, "/srv/static"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.geoip_url.host_str(), Some("geo.example.com"));
        assert_eq!(
            config.station_feed_url.as_str(),
            "https://feed.example.com/stations.json"
        );
        assert_eq!(config.http_timeout_secs, 2);
        assert_eq!(config.max_retries, 0);
        assert!(config.trust_forwarded_for);
        assert!(config.strict_bounds);
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = config_from(&[(ENV_MAX_RETRIES, "  ")]).unwrap();
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn rejects_bad_values() {
        let err = config_from(&[(ENV_HTTP_TIMEOUT_SECS, "soon")]).unwrap_err();
        let ConfigError::Invalid { var, value, .. } = err;
        assert_eq!(var, ENV_HTTP_TIMEOUT_SECS);
        assert_eq!(value, "soon");

        assert!(config_from(&[(ENV_HTTP_TIMEOUT_SECS, "0")]).is_err());
        assert!(config_from(&[(ENV_BIND_ADDR, "localhost")]).is_err());
        assert!(config_from(&[(ENV_GEOIP_URL, "ftp://geo.example.com/")]).is_err());
        assert!(config_from(&[(ENV_GEOIP_URL, "http://geo.example.com/?key=1")]).is_err());
        assert!(config_from(&[(ENV_STATION_FEED_URL, "not a url")]).is_err());
        assert!(config_from(&[(ENV_STRICT_BOUNDS, "maybe")]).is_err());
    }

    #[test]
    fn error_display() {
        let err = config_from(&[(ENV_STRICT_BOUNDS, "maybe")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DOCK_STRICT_BOUNDS: invalid value \"maybe\": expected true or false"
        );
    }

    #[test]
    fn client_configs_share_settings() {
        let config = config_from(&[
            (ENV_HTTP_TIMEOUT_SECS, "3"),
            (ENV_MAX_RETRIES, "2"),
            (ENV_STRICT_BOUNDS, "1"),
        ])
        .unwrap();

        let geo = config.geo_resolver();
        assert_eq!(geo.timeout_secs, 3);
        assert_eq!(geo.retry.max_retries, 2);
        assert!(geo.strict_bounds);

        let catalog = config.station_catalog();
        assert_eq!(catalog.feed_url, config.station_feed_url);
        assert_eq!(catalog.timeout_secs, 3);
        assert_eq!(catalog.retry.max_retries, 2);
        assert!(catalog.strict_bounds);
    }
}
