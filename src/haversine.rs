//! Haversine cost-matrix provider (offline fallback and test wiring).
//!
//! Uses great-circle distance and an assumed driving speed to fill both
//! metrics of the matrix. Less accurate than a routing service (ignores
//! roads) but never unavailable and never makes a network call.

use crate::traits::{Coordinate, CostMatrix, MatrixProvider, ProviderError};

/// Average driving speed assumption for duration estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Great-circle distance between two points in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lon = (to.lon - from.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    fn km_to_seconds(&self, km: f64) -> f64 {
        km / self.speed_kmh * 3600.0
    }
}

impl MatrixProvider for HaversineMatrix {
    fn matrix_for(&self, coords: &[Coordinate]) -> Result<CostMatrix, ProviderError> {
        let n = coords.len();
        let mut distances = vec![vec![Some(0.0); n]; n];
        let mut durations = vec![vec![Some(0.0); n]; n];

        for (i, from) in coords.iter().enumerate() {
            for (j, to) in coords.iter().enumerate() {
                if i != j {
                    let km = Self::haversine_km(*from, *to);
                    distances[i][j] = Some(km);
                    durations[i][j] = Some(self.km_to_seconds(km));
                }
            }
        }

        Ok(CostMatrix {
            distances_km: distances,
            durations_s: durations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = HaversineMatrix::haversine_km(coord(12.97, 77.59), coord(12.97, 77.59));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Bengaluru (12.97, 77.59) to Mumbai (19.08, 72.88)
        // Actual distance ~840 km
        let dist = HaversineMatrix::haversine_km(coord(12.97, 77.59), coord(19.08, 72.88));
        assert!(
            dist > 800.0 && dist < 880.0,
            "BLR to BOM should be ~840km, got {}",
            dist
        );
    }

    #[test]
    fn test_matrix_diagonal_is_zero() {
        let provider = HaversineMatrix::default();
        let coords = vec![coord(12.9, 77.5), coord(13.0, 77.6), coord(13.1, 77.7)];
        let matrix = provider.matrix_for(&coords).unwrap();

        for i in 0..coords.len() {
            assert_eq!(matrix.durations_s[i][i], Some(0.0), "Diagonal should be zero");
            assert_eq!(matrix.distances_km[i][i], Some(0.0), "Diagonal should be zero");
        }
    }

    #[test]
    fn test_matrix_symmetric() {
        let provider = HaversineMatrix::default();
        let coords = vec![coord(12.9, 77.5), coord(13.0, 77.6)];
        let matrix = provider.matrix_for(&coords).unwrap();

        // Haversine is symmetric
        assert_eq!(matrix.cost(0, 1), matrix.cost(1, 0), "Matrix should be symmetric");
    }

    #[test]
    fn test_reasonable_travel_time() {
        let provider = HaversineMatrix::new(40.0); // 40 km/h
        // 10 km at 40 km/h = 0.25 hours = 900 seconds
        let seconds = provider.km_to_seconds(10.0);
        assert!((seconds - 900.0).abs() < 1e-9);
    }
}
