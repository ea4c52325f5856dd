//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::Coordinate;
use crate::locate::Located;

/// Nearest-station page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct NearestStationTemplate {
    pub user_lat_long: Coordinate,
    pub closest_lat_lon: Coordinate,
    pub addr: String,
    pub station_name: Option<String>,
    pub available_bikes: Option<u32>,
    pub available_docks: Option<u32>,
    pub distance: String,
}

impl NearestStationTemplate {
    /// Create from a lookup result.
    pub fn from_located(located: &Located) -> Self {
        let station = &located.station;
        Self {
            user_lat_long: located.user,
            closest_lat_lon: station.coordinate,
            addr: station.address.clone(),
            // Only worth showing when it adds something to the address.
            station_name: station.name.clone().filter(|n| n != &station.address),
            available_bikes: station.available_bikes,
            available_docks: station.available_docks,
            distance: format_distance(located.distance_km),
        }
    }
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

/// Format a distance for display: metres below 1 km, else one decimal of km.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as u64)
    } else {
        format!("{km:.1} km")
    }
}
