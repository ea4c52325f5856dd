//! IP geolocation lookup.
//!
//! Resolves the requesting client's network address to an approximate
//! coordinate using an ip-api compatible JSON endpoint.

mod client;

pub use client::{
    DEFAULT_BASE_URL, GeoResolver, GeoResolverConfig, GeoResponse, parse_response,
};
