//! Bike-share station feed.
//!
//! Fetches the live `stationBeanList` document fresh on every request and
//! validates each entry before it reaches the nearest-station search.

mod client;

pub use client::{
    DEFAULT_FEED_URL, StationBean, StationCatalog, StationCatalogConfig, StationFeed, parse_feed,
};
