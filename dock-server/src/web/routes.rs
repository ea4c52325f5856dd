//! HTTP route handlers.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use askama::Template;
use axum::{
    Router,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::LocateError;
use crate::locate::locate_nearest;

use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory. Serve the
/// router with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// handler can see the peer address.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(nearest_station_page))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Nearest station to the requesting client.
async fn nearest_station_page(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let client = client_address(&headers, peer, state.trust_forwarded_for);

    let located = locate_nearest(state.geo.as_ref(), state.catalog.as_ref(), &client).await?;
    info!(
        %client,
        station = %located.station.address,
        distance_km = located.distance_km,
        "located nearest station"
    );

    let html = NearestStationTemplate::from_located(&located)
        .render()
        .map_err(|e| AppError::Internal {
            message: format!("Template error: {e}"),
        })?;

    Ok(Html(html))
}

/// The address to geolocate for this request.
///
/// With `trust_forwarded_for`, the first `X-Forwarded-For` entry wins if it
/// is a valid IP address. Otherwise the peer's IP is used. IPv4-mapped IPv6
/// addresses are reported in their IPv4 form.
pub fn client_address(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_canonical().to_string();
        }
    }
    peer.ip().to_canonical().to_string()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Locate(LocateError),
    Internal { message: String },
}

impl From<LocateError> for AppError {
    fn from(e: LocateError) -> Self {
        AppError::Locate(e)
    }
}

impl AppError {
    /// Status code and user-facing wording. Details stay in the logs.
    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Locate(LocateError::EmptyCatalog(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "No stations available")
            }
            AppError::Locate(_) => (StatusCode::BAD_GATEWAY, "Location unavailable"),
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();

        match &self {
            AppError::Locate(e) => error!(%status, "request failed: {e}"),
            AppError::Internal { message } => error!(%status, "request failed: {message}"),
        }

        let page = ErrorTemplate {
            title: title.to_string(),
            message: "We couldn't find your nearest station right now. Please try again later."
                .to_string(),
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, title).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::domain::InvalidCoordinate;
    use crate::error::{Provider, UpstreamError};
    use crate::nearest::EmptyCatalog;

    fn peer() -> SocketAddr {
        "198.51.100.20:54321".parse().unwrap()
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn uses_peer_ip_by_default() {
        let headers = forwarded("203.0.113.7");
        assert_eq!(client_address(&headers, peer(), false), "198.51.100.20");
    }

    #[test]
    fn uses_first_forwarded_entry_when_trusted() {
        let headers = forwarded("203.0.113.7, 10.0.0.1");
        assert_eq!(client_address(&headers, peer(), true), "203.0.113.7");

        let headers = forwarded(" 2001:db8::1 ");
        assert_eq!(client_address(&headers, peer(), true), "2001:db8::1");
    }

    #[test]
    fn unmaps_ipv4_mapped_addresses() {
        let mapped: SocketAddr = "[::ffff:198.51.100.20]:54321".parse().unwrap();
        assert_eq!(
            client_address(&HeaderMap::new(), mapped, false),
            "198.51.100.20"
        );

        let headers = forwarded("::ffff:203.0.113.7");
        assert_eq!(client_address(&headers, peer(), true), "203.0.113.7");

        let v6: SocketAddr = "[2001:db8::5]:443".parse().unwrap();
        assert_eq!(client_address(&HeaderMap::new(), v6, false), "2001:db8::5");
    }

    #[test]
    fn ignores_garbage_forwarded_header() {
        let headers = forwarded("../admin");
        assert_eq!(client_address(&headers, peer(), true), "198.51.100.20");

        assert_eq!(
            client_address(&HeaderMap::new(), peer(), true),
            "198.51.100.20"
        );
    }

    #[test]
    fn error_status_mapping() {
        let upstream = AppError::from(LocateError::from(UpstreamError::Status {
            provider: Provider::GeoIp,
            status: 500,
            body: String::new(),
        }));
        assert_eq!(upstream.status_and_title().0, StatusCode::BAD_GATEWAY);

        let malformed = AppError::from(LocateError::malformed(Provider::StationFeed, "bad"));
        assert_eq!(malformed.status_and_title().0, StatusCode::BAD_GATEWAY);

        let empty = AppError::from(LocateError::from(EmptyCatalog));
        assert_eq!(empty.status_and_title().0, StatusCode::SERVICE_UNAVAILABLE);

        let invalid: InvalidCoordinate =
            crate::domain::Coordinate::new(f64::NAN, 0.0).unwrap_err();
        let invalid = AppError::from(LocateError::from(invalid));
        assert_eq!(invalid.status_and_title().0, StatusCode::BAD_GATEWAY);

        let internal = AppError::Internal {
            message: "boom".into(),
        };
        assert_eq!(
            internal.status_and_title().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_response_is_opaque_html() {
        let response = AppError::from(LocateError::malformed(
            Provider::StationFeed,
            "missing `stationBeanList`",
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }
}
