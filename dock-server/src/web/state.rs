//! Application state for the web layer.

use std::sync::Arc;

use crate::catalog::StationCatalog;
use crate::geoip::GeoResolver;

/// Shared application state.
///
/// Built once at startup and never mutated; every request gets a cheap clone.
#[derive(Clone)]
pub struct AppState {
    /// IP geolocation client
    pub geo: Arc<GeoResolver>,

    /// Station feed client
    pub catalog: Arc<StationCatalog>,

    /// Take the client address from `X-Forwarded-For`
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Create a new app state.
    pub fn new(geo: GeoResolver, catalog: StationCatalog, trust_forwarded_for: bool) -> Self {
        Self {
            geo: Arc::new(geo),
            catalog: Arc::new(catalog),
            trust_forwarded_for,
        }
    }
}
