//! Live OpenRouteService round trip.
//!
//! Hits the hosted ORS and Nominatim APIs; needs an `ORS_API_KEY` in the
//! environment and network access. Run explicitly:
//!
//! ```sh
//! ORS_API_KEY=... cargo test --test ors_integration -- --ignored
//! ```

use std::env;

use route_planner::ors::{OrsClient, OrsConfig};
use route_planner::traits::{Coordinate, DirectionsProvider, Geocoder, MatrixProvider};

fn client() -> Option<OrsClient> {
    let api_key = match env::var("ORS_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            eprintln!("ORS_API_KEY not set; skipping live ORS test");
            return None;
        }
    };
    Some(OrsClient::new(OrsConfig::with_api_key(api_key)).expect("build ORS client"))
}

#[test]
#[ignore = "requires ORS_API_KEY and network access"]
fn ors_geocode_matrix_and_directions() {
    let Some(client) = client() else { return };

    let coord = client
        .geocode("MG Road, Bengaluru")
        .expect("geocode request")
        .expect("geocode candidate");
    assert!((12.0..14.0).contains(&coord.lat), "lat {}", coord.lat);
    assert!((77.0..78.0).contains(&coord.lon), "lon {}", coord.lon);

    let stops = vec![
        Coordinate { lat: 12.9767, lon: 77.5713 },
        Coordinate { lat: 12.9346, lon: 77.6110 },
        Coordinate { lat: 12.9719, lon: 77.6412 },
    ];

    let matrix = client.matrix_for(&stops).expect("matrix request");
    assert_eq!(matrix.len(), stops.len());
    assert!(matrix.cost(0, 1).is_some());

    let directions = client
        .directions_for(&stops[..2])
        .expect("directions request");
    assert!(directions.distance_km > 0.0);
    assert!(directions.duration_s > 0.0);
    assert!(directions.geometry.is_some());
}
