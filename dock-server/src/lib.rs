//! Nearest bike-share dock server.
//!
//! A web application that answers: "where is the closest bike-share
//! station to me right now?" It geolocates the requesting client by IP,
//! fetches the live station feed, and picks the station with the smallest
//! great-circle distance.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod geoip;
pub mod json;
pub mod locate;
pub mod nearest;
pub mod upstream;
pub mod web;

pub use error::{LocateError, Provider, UpstreamError};
pub use locate::{GeoLookup, Located, StationSource, locate_nearest};
pub use nearest::{EmptyCatalog, find_nearest};
