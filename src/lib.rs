//! route-planner core
//!
//! Multi-stop delivery route planning: fallback-chained geocoding, a
//! pairwise travel-cost matrix, deterministic tour ordering, traffic-
//! adjusted segment aggregation, and a blended ETA prediction.

pub mod traits;
pub mod geometry;
pub mod geocode;
pub mod ors;
pub mod nominatim;
pub mod haversine;
pub mod tour;
pub mod traffic;
pub mod segments;
pub mod eta;
pub mod planner;
