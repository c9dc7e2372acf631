use route_planner::geocode::AddressResolver;
use route_planner::haversine::HaversineMatrix;
use route_planner::planner::{PlanRequest, Planner};
use route_planner::traits::{Coordinate, Directions, DirectionsProvider, ProviderError};

struct StubDirections;

impl DirectionsProvider for StubDirections {
    fn directions_for(&self, _coords: &[Coordinate]) -> Result<Directions, ProviderError> {
        Ok(Directions {
            distance_km: 4.2,
            duration_s: 480.0,
            geometry: None,
        })
    }
}

#[test]
fn plans_two_literal_stops() {
    let planner = Planner::new(
        AddressResolver::new(Vec::new()),
        HaversineMatrix::default(),
        StubDirections,
    );

    let plan = planner.plan(&PlanRequest {
        addresses: vec!["12.9767,77.5713".to_string(), "12.9346,77.6110".to_string()],
        start_time: Some("2024-03-04T09:00:00".to_string()),
        vehicle_start_address: None,
    });

    assert_eq!(plan.num_stops, 2);
    assert!(plan.ors_duration_minutes > 0.0);
    assert!(plan.predicted_eta_minutes.unwrap() >= plan.ors_duration_minutes);
}
