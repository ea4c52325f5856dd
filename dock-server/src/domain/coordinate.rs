//! Geographic coordinate type and great-circle distance.

use std::f64::consts::PI;
use std::fmt;

/// Mean Earth radius used to turn angular distance into kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned when a latitude/longitude pair cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lon}): {reason}")]
pub struct InvalidCoordinate {
    lat: f64,
    lon: f64,
    reason: &'static str,
}

/// A latitude/longitude pair in degrees.
///
/// Both components are guaranteed finite. The range is not checked by
/// [`Coordinate::new`], so feeds with slightly out-of-range values keep
/// working; use [`Coordinate::new_bounded`] for strict validation.
///
/// # Examples
///
/// ```
/// use dock_server::domain::Coordinate;
///
/// let esb = Coordinate::new(40.7484, -73.9857).unwrap();
/// assert_eq!(esb.lat(), 40.7484);
///
/// // Non-finite values are rejected
/// assert!(Coordinate::new(f64::NAN, 0.0).is_err());
///
/// // Bounds are only enforced on request
/// assert!(Coordinate::new(91.0, 0.0).is_ok());
/// assert!(Coordinate::new_bounded(91.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate from finite degrees, without range checks.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate {
                lat,
                lon,
                reason: "latitude and longitude must be finite",
            });
        }
        Ok(Self { lat, lon })
    }

    /// Create a coordinate, also requiring `|lat| <= 90` and `|lon| <= 180`.
    pub fn new_bounded(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        let coord = Self::new(lat, lon)?;
        if lat.abs() > 90.0 {
            return Err(InvalidCoordinate {
                lat,
                lon,
                reason: "latitude must be within [-90, 90]",
            });
        }
        if lon.abs() > 180.0 {
            return Err(InvalidCoordinate {
                lat,
                lon,
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(coord)
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle angle to `other` in radians (spherical law of cosines).
    ///
    /// The cosine is clamped to `[-1, 1]` before `acos`, so antipodal points
    /// give `PI` rather than `NaN`. Identical points give exactly `0`.
    pub fn angle_to(&self, other: &Coordinate) -> f64 {
        if self == other {
            return 0.0;
        }

        let phi1 = to_radians(90.0 - self.lat);
        let phi2 = to_radians(90.0 - other.lat);
        let theta1 = to_radians(self.lon);
        let theta2 = to_radians(other.lon);

        let cos = phi1.sin() * phi2.sin() * (theta1 - theta2).cos() + phi1.cos() * phi2.cos();
        cos.clamp(-1.0, 1.0).acos()
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        self.angle_to(other) * EARTH_RADIUS_KM
    }
}

fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn accepts_unchecked_range() {
        assert!(Coordinate::new(120.0, 500.0).is_ok());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn bounded_rejects_out_of_range() {
        assert!(Coordinate::new_bounded(90.0, 180.0).is_ok());
        assert!(Coordinate::new_bounded(-90.0, -180.0).is_ok());
        assert!(Coordinate::new_bounded(90.5, 0.0).is_err());
        assert!(Coordinate::new_bounded(0.0, -180.5).is_err());
    }

    #[test]
    fn error_display() {
        let err = Coordinate::new_bounded(91.0, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid coordinate (91, 0): latitude must be within [-90, 90]"
        );
    }

    #[test]
    fn same_point_is_zero() {
        let esb = coord(40.7484, -73.9857);
        assert_eq!(esb.angle_to(&esb), 0.0);
        assert_eq!(esb.distance_km(&esb), 0.0);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 180.0);
        let angle = a.angle_to(&b);
        assert!(!angle.is_nan());
        assert!((angle - PI).abs() < 1e-9);

        let north = coord(90.0, 0.0);
        let south = coord(-90.0, 0.0);
        assert!((north.angle_to(&south) - PI).abs() < 1e-9);
    }

    #[test]
    fn quarter_circle() {
        let equator = coord(0.0, 0.0);
        let pole = coord(90.0, 0.0);
        assert!((equator.angle_to(&pole) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn midtown_distance_is_about_a_kilometre() {
        let esb = coord(40.7484, -73.9857);
        let times_square = coord(40.7580, -73.9855);
        let km = esb.distance_km(&times_square);
        assert!(km > 1.0 && km < 1.2, "got {km}");
    }

    #[test]
    fn display_and_debug() {
        let c = coord(40.1, -73.9);
        assert_eq!(c.to_string(), "40.1, -73.9");
        assert_eq!(format!("{c:?}"), "Coordinate(40.1, -73.9)");
    }
}
