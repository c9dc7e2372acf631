//! Heuristic traffic model.
//!
//! Deterministic time/location multiplier applied to raw routing-service
//! durations. A configured real-time `TrafficFeed` overrides this model
//! entirely for a segment; until such a feed exists this heuristic is the
//! only source.

use tracing::debug;

use crate::traits::Coordinate;

/// A metro area with known congestion, as a closed lat/lon rectangle.
#[derive(Debug, Clone)]
pub struct MetroRegion {
    pub name: &'static str,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Congestion factor applied on top of the time-band multiplier.
    pub factor: f64,
}

impl MetroRegion {
    fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

const DEFAULT_REGIONS: &[MetroRegion] = &[
    MetroRegion {
        name: "bengaluru",
        min_lat: 12.5,
        max_lat: 13.5,
        min_lon: 77.0,
        max_lon: 78.0,
        factor: 1.1,
    },
    MetroRegion {
        name: "mumbai",
        min_lat: 18.5,
        max_lat: 19.5,
        min_lon: 72.5,
        max_lon: 73.5,
        factor: 1.2,
    },
    MetroRegion {
        name: "delhi",
        min_lat: 28.0,
        max_lat: 29.0,
        min_lon: 76.5,
        max_lon: 77.5,
        factor: 1.15,
    },
];

/// Segment-distance thresholds for the final correction step.
const LONG_SEGMENT_KM: f64 = 10.0;
const SHORT_SEGMENT_KM: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct TrafficModel {
    regions: Vec<MetroRegion>,
}

impl Default for TrafficModel {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS.to_vec(),
        }
    }
}

impl TrafficModel {
    pub fn with_regions(regions: Vec<MetroRegion>) -> Self {
        Self { regions }
    }

    /// Time-of-day base multiplier. Rush hour wins the 10:00 overlap with
    /// the daytime band.
    pub fn base_multiplier(hour: u32) -> f64 {
        match hour {
            7..=10 | 17..=19 => 2.2,
            11..=16 => 1.8,
            20..=22 => 1.5,
            _ => 1.2,
        }
    }

    /// Full heuristic multiplier for a segment: time band, then metro
    /// congestion, then segment-length correction.
    pub fn multiplier(&self, point: Coordinate, hour: u32, segment_km: f64) -> f64 {
        let mut multiplier = Self::base_multiplier(hour);

        if let Some(region) = self.regions.iter().find(|r| r.contains(point)) {
            multiplier *= region.factor;
        }

        if segment_km > LONG_SEGMENT_KM {
            multiplier *= 1.1;
        } else if segment_km < SHORT_SEGMENT_KM {
            multiplier *= 0.9;
        }

        debug!(
            hour,
            lat = point.lat,
            lon = point.lon,
            segment_km,
            multiplier,
            "traffic multiplier"
        );
        multiplier
    }
}
