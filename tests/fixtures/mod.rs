//! Test fixtures for route-planner.
//!
//! Provides real Bengaluru delivery locations (from OpenStreetMap) and
//! small helpers shared across the integration tests.

pub mod bengaluru_locations;

pub use bengaluru_locations::*;
