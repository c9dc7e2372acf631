//! Core domain types and provider traits for the route planner.
//!
//! Every external service the planner talks to sits behind one of these
//! traits so the pipeline can be exercised with injected fakes. Concrete
//! HTTP adapters live in `ors` and `nominatim`.

use serde::{Deserialize, Serialize};

use crate::eta::RouteFeatures;
use crate::geometry::RouteGeometry;
use crate::planner::CompletedRoute;

/// A resolved geographic position (latitude, longitude) in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside valid ranges.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    /// Midpoint of the straight line between two coordinates.
    ///
    /// Good enough for picking a representative point of a road segment;
    /// not a great-circle midpoint.
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate {
            lat: (self.lat + other.lat) / 2.0,
            lon: (self.lon + other.lon) / 2.0,
        }
    }
}

/// Pairwise travel costs between all stops, indexed by stop position.
///
/// Entries are `None` where the provider could not connect two points;
/// ordering logic treats those as infinite cost.
#[derive(Debug, Clone, Default)]
pub struct CostMatrix {
    /// Distances in kilometres. May be empty if the provider omitted them.
    pub distances_km: Vec<Vec<Option<f64>>>,
    /// Durations in seconds. May be empty if the provider omitted them.
    pub durations_s: Vec<Vec<Option<f64>>>,
}

impl CostMatrix {
    /// Number of stops covered by the matrix.
    pub fn len(&self) -> usize {
        if self.durations_s.is_empty() {
            self.distances_km.len()
        } else {
            self.durations_s.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordering cost from one stop to another.
    ///
    /// Prefers durations, falling back to distances when the provider only
    /// returned one metric.
    pub fn cost(&self, from: usize, to: usize) -> Option<f64> {
        let table = if self.durations_s.is_empty() {
            &self.distances_km
        } else {
            &self.durations_s
        };
        table.get(from).and_then(|row| row.get(to)).copied().flatten()
    }
}

/// Point-to-point (or multi-stop) directions as returned by a provider.
#[derive(Debug, Clone)]
pub struct Directions {
    pub distance_km: f64,
    pub duration_s: f64,
    /// Display geometry payload; passed through to the caller untouched.
    pub geometry: Option<RouteGeometry>,
}

/// Failure of a single outbound provider call.
///
/// These are ordinary, expected conditions; callers decide per the error
/// taxonomy whether a failed call aborts the request or degrades it.
#[derive(Debug)]
pub enum ProviderError {
    Http(reqwest::Error),
    /// Non-success HTTP status with a body excerpt for diagnostics.
    Status(u16, String),
    /// Response decoded but did not contain the expected fields.
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err)
    }
}

/// Resolves a free-text address to a coordinate.
///
/// `Ok(None)` means the provider answered but had no usable candidate;
/// both that and `Err` advance the resolver to the next provider in the
/// chain.
pub trait Geocoder {
    /// Short provider name for logging.
    fn name(&self) -> &'static str;

    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError>;
}

/// Provides a pairwise distance/duration matrix for a set of coordinates.
pub trait MatrixProvider {
    fn matrix_for(&self, coords: &[Coordinate]) -> Result<CostMatrix, ProviderError>;
}

/// Provides turn-by-turn directions for an ordered coordinate list.
pub trait DirectionsProvider {
    fn directions_for(&self, coords: &[Coordinate]) -> Result<Directions, ProviderError>;
}

/// Optional real-time traffic source.
///
/// When a feed returns a multiplier for a point, it replaces the heuristic
/// traffic model entirely for that segment.
pub trait TrafficFeed {
    fn multiplier_at(&self, point: Coordinate) -> Option<f64>;
}

/// Learned duration-correction model (external collaborator).
///
/// Absence or failure is a normal condition; `None` routes the blender to
/// its fallback buffer.
pub trait EtaPredictor {
    fn predict(&self, features: &RouteFeatures) -> Option<f64>;
}

/// Accepts finished routes for later offline training.
///
/// Fire-and-forget from the planner's perspective: a sink failure must not
/// affect the response already produced.
pub trait CompletedRouteSink {
    fn record(&self, route: &CompletedRoute) -> Result<(), ProviderError>;
}
