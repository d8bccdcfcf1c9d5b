//! Service layer
//!
//! Short-code generation and client geolocation, shared by the HTTP handlers.

pub mod geoip;
pub mod shortcode;

pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider, UNKNOWN_LOCATION};
