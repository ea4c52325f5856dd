//! Nearest-station selection.

use crate::domain::{Coordinate, StationRecord};

/// Error returned when there are no stations to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("station feed contained no stations")]
pub struct EmptyCatalog;

/// Find the station closest to `user` by great-circle distance.
///
/// Scans left to right and keeps the first station on ties. The result
/// borrows from `stations`, so it is always one of the inputs.
pub fn find_nearest<'a>(
    stations: &'a [StationRecord],
    user: &Coordinate,
) -> Result<&'a StationRecord, EmptyCatalog> {
    let mut iter = stations.iter();
    let first = iter.next().ok_or(EmptyCatalog)?;

    let mut best = first;
    let mut best_angle = first.coordinate.angle_to(user);

    for station in iter {
        let angle = station.coordinate.angle_to(user);
        if angle < best_angle {
            best = station;
            best_angle = angle;
        }
    }

    Ok(best)
}
