//! Real Bengaluru locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. All points fall inside the
//! planner's Bengaluru metro bounding box.

use route_planner::traits::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    pub fn coord(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

// ============================================================================
// Depot / start candidates
// ============================================================================

pub const DEPOTS: &[Location] = &[
    Location::new("Majestic Bus Stand", 12.9767, 77.5713),
    Location::new("KSR Railway Station", 12.9783, 77.5685),
];

// ============================================================================
// Delivery stops around central Bengaluru
// ============================================================================

pub const DELIVERY_STOPS: &[Location] = &[
    Location::new("MG Road Metro Station", 12.9757, 77.6066),
    Location::new("Koramangala Forum Mall", 12.9346, 77.6110),
    Location::new("Indiranagar 100 Feet Road", 12.9719, 77.6412),
    Location::new("Jayanagar 4th Block", 12.9254, 77.5832),
    Location::new("Whitefield Phoenix Marketcity", 12.9959, 77.6966),
    Location::new("Hebbal Flyover", 13.0358, 77.5970),
];
