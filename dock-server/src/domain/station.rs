//! Bike-share station record.

use super::Coordinate;

/// One docking station from the station feed.
///
/// Stations are keyed by street address; the remaining feed fields are
/// informational and may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    /// Station location
    pub coordinate: Coordinate,

    /// Street address (`stAddress1` in the feed)
    pub address: String,

    /// Feed identifier, if present
    pub id: Option<i64>,

    /// Display name, if present
    pub name: Option<String>,

    /// Bikes currently docked, if reported
    pub available_bikes: Option<u32>,

    /// Free docks, if reported
    pub available_docks: Option<u32>,
}

impl StationRecord {
    /// Create a record with only the required fields.
    pub fn new(coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            address: address.into(),
            id: None,
            name: None,
            available_bikes: None,
            available_docks: None,
        }
    }
}
