//! Per-request composition: geolocate, fetch stations, pick the nearest.

use crate::catalog::StationCatalog;
use crate::domain::{Coordinate, StationRecord};
use crate::error::LocateError;
use crate::geoip::GeoResolver;
use crate::nearest::find_nearest;

/// Something that can turn a client address into a coordinate.
pub trait GeoLookup {
    fn resolve(
        &self,
        client_address: &str,
    ) -> impl Future<Output = Result<Coordinate, LocateError>> + Send;
}

/// Something that can produce the current station list.
pub trait StationSource {
    fn fetch_stations(
        &self,
    ) -> impl Future<Output = Result<Vec<StationRecord>, LocateError>> + Send;
}

impl GeoLookup for GeoResolver {
    fn resolve(
        &self,
        client_address: &str,
    ) -> impl Future<Output = Result<Coordinate, LocateError>> + Send {
        GeoResolver::resolve(self, client_address)
    }
}

impl StationSource for StationCatalog {
    fn fetch_stations(
        &self,
    ) -> impl Future<Output = Result<Vec<StationRecord>, LocateError>> + Send {
        StationCatalog::fetch_stations(self)
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// Where the client appears to be
    pub user: Coordinate,
    /// The closest station
    pub station: StationRecord,
    /// Great-circle distance from `user` to `station`
    pub distance_km: f64,
}

/// Find the station nearest to `client_address`.
///
/// The geolocation lookup and the station fetch are independent, so they
/// run concurrently; the first failure cancels the other.
pub async fn locate_nearest<G, S>(
    geo: &G,
    catalog: &S,
    client_address: &str,
) -> Result<Located, LocateError>
where
    G: GeoLookup + Sync,
    S: StationSource + Sync,
{
    let (user, stations) =
        tokio::try_join!(geo.resolve(client_address), catalog.fetch_stations())?;

    let station = find_nearest(&stations, &user)?;

    Ok(Located {
        user,
        distance_km: user.distance_km(&station.coordinate),
        station: station.clone(),
    })
}
