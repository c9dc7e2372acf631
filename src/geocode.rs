//! Address resolution with provider fallback.
//!
//! Resolution order: literal `"lat,lon"` parse (no network), then each
//! configured geocoder in priority order, then hard-coded city-centre
//! coordinates for a handful of known metro names. An address that fails
//! every step fails the whole planning request.

use tracing::{debug, info, warn};

use crate::traits::{Coordinate, Geocoder};

/// City-centre fallbacks, matched case-insensitively on name substrings.
const CITY_CENTERS: &[(&[&str], Coordinate)] = &[
    (
        &["bangalore", "bengaluru"],
        Coordinate {
            lat: 12.9716,
            lon: 77.5946,
        },
    ),
    (
        &["mumbai", "bombay"],
        Coordinate {
            lat: 19.0760,
            lon: 72.8777,
        },
    ),
    (
        &["delhi", "new delhi"],
        Coordinate {
            lat: 28.6139,
            lon: 77.2090,
        },
    ),
];

/// Ordered chain of geocoding strategies with graceful degradation.
pub struct AddressResolver {
    geocoders: Vec<Box<dyn Geocoder + Send + Sync>>,
}

impl AddressResolver {
    /// Builds a resolver that tries `geocoders` in the order given.
    pub fn new(geocoders: Vec<Box<dyn Geocoder + Send + Sync>>) -> Self {
        Self { geocoders }
    }

    /// Resolves one address, or `None` if every strategy fails.
    pub fn resolve(&self, address: &str) -> Option<Coordinate> {
        if let Some(coord) = parse_literal(address) {
            info!(address, lat = coord.lat, lon = coord.lon, "using literal coordinates");
            return Some(coord);
        }

        for geocoder in &self.geocoders {
            match geocoder.geocode(address) {
                Ok(Some(coord)) => {
                    info!(
                        provider = geocoder.name(),
                        address,
                        lat = coord.lat,
                        lon = coord.lon,
                        "geocoded"
                    );
                    return Some(coord);
                }
                Ok(None) => {
                    debug!(provider = geocoder.name(), address, "no candidates");
                }
                Err(err) => {
                    warn!(provider = geocoder.name(), address, ?err, "geocoding failed");
                }
            }
        }

        match city_center_fallback(address) {
            Some(coord) => {
                info!(address, lat = coord.lat, lon = coord.lon, "using city-centre fallback");
                Some(coord)
            }
            None => {
                warn!(address, "address could not be resolved by any provider");
                None
            }
        }
    }
}

/// Parses an address of the form `"lat,lon"` with both halves in range.
///
/// Exactly one comma is required; anything else goes through geocoding.
pub fn parse_literal(address: &str) -> Option<Coordinate> {
    if address.matches(',').count() != 1 {
        return None;
    }
    let (lat_part, lon_part) = address.split_once(',')?;
    let lat: f64 = lat_part.trim().parse().ok()?;
    let lon: f64 = lon_part.trim().parse().ok()?;
    Coordinate::new(lat, lon)
}

fn city_center_fallback(address: &str) -> Option<Coordinate> {
    let lower = address.to_lowercase();
    for (names, coord) in CITY_CENTERS {
        if names.iter().any(|name| lower.contains(name)) {
            return Some(*coord);
        }
    }
    None
}
