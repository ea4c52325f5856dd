//! Domain types for the nearest-dock finder.
//!
//! Values are validated at construction, so code holding a
//! [`Coordinate`] can trust that it is finite.

mod coordinate;
mod station;

pub use coordinate::{Coordinate, EARTH_RADIUS_KM, InvalidCoordinate};
pub use station::StationRecord;
