//! End-to-end planner tests over mock providers.
//!
//! Covers the identity-order delivery policy, abort semantics for
//! resolution and matrix failures, arbitrary-start reordering, and the
//! prediction clamp.

mod fixtures;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use route_planner::eta::RouteFeatures;
use route_planner::geocode::AddressResolver;
use route_planner::geometry::RouteGeometry;
use route_planner::haversine::HaversineMatrix;
use route_planner::planner::{CompletedRoute, PlanError, PlanRequest, Planner, RoutePlan};
use route_planner::traits::{
    CompletedRouteSink, Coordinate, CostMatrix, Directions, DirectionsProvider, EtaPredictor,
    Geocoder, MatrixProvider, ProviderError,
};

use fixtures::{DELIVERY_STOPS, DEPOTS};

// ============================================================================
// Mock Providers
// ============================================================================

/// Geocoder backed by a fixed address book.
struct BookGeocoder {
    book: HashMap<String, Coordinate>,
}

impl BookGeocoder {
    fn new(entries: &[(&str, Coordinate)]) -> Self {
        Self {
            book: entries
                .iter()
                .map(|(name, coord)| (name.to_string(), *coord))
                .collect(),
        }
    }
}

impl Geocoder for BookGeocoder {
    fn name(&self) -> &'static str {
        "book"
    }

    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        Ok(self.book.get(address).copied())
    }
}

/// Directions provider returning a constant 5 km / 600 s per call.
struct ConstantDirections;

impl DirectionsProvider for ConstantDirections {
    fn directions_for(&self, coords: &[Coordinate]) -> Result<Directions, ProviderError> {
        Ok(Directions {
            distance_km: 5.0,
            duration_s: 600.0,
            geometry: Some(RouteGeometry::new(serde_json::json!({
                "type": "Feature",
                "stops": coords.len(),
            }))),
        })
    }
}

struct OutageMatrix;

impl MatrixProvider for OutageMatrix {
    fn matrix_for(&self, _coords: &[Coordinate]) -> Result<CostMatrix, ProviderError> {
        Err(ProviderError::Status(503, "service unavailable".to_string()))
    }
}

struct FixedPredictor(Option<f64>);

impl EtaPredictor for FixedPredictor {
    fn predict(&self, _features: &RouteFeatures) -> Option<f64> {
        self.0
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    records: Arc<Mutex<Vec<CompletedRoute>>>,
}

impl CompletedRouteSink for RecordingSink {
    fn record(&self, route: &CompletedRoute) -> Result<(), ProviderError> {
        self.records.lock().unwrap().push(route.clone());
        Ok(())
    }
}

struct RejectingSink;

impl CompletedRouteSink for RejectingSink {
    fn record(&self, _route: &CompletedRoute) -> Result<(), ProviderError> {
        Err(ProviderError::Status(500, "sink down".to_string()))
    }
}

// ============================================================================
// Fixture builders
// ============================================================================

/// Three stops in given order: depot, MG Road, Koramangala.
fn delivery_addresses() -> Vec<String> {
    vec![
        "Current Location".to_string(),
        "Stop A".to_string(),
        "Stop B".to_string(),
    ]
}

fn delivery_geocoder() -> BookGeocoder {
    BookGeocoder::new(&[
        ("Current Location", DEPOTS[0].coord()),
        ("Stop A", DELIVERY_STOPS[0].coord()),
        ("Stop B", DELIVERY_STOPS[1].coord()),
    ])
}

fn resolver_with(geocoder: BookGeocoder) -> AddressResolver {
    AddressResolver::new(vec![Box::new(geocoder)])
}

fn request(addresses: Vec<String>) -> PlanRequest {
    PlanRequest {
        addresses,
        // Monday 14:00: daytime band, weekday.
        start_time: Some("2024-03-04T14:00:00".to_string()),
        vehicle_start_address: None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn sequential_delivery_route_is_not_reordered() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    );

    let plan = planner.plan(&request(delivery_addresses()));

    assert_eq!(plan.ordered_addresses, delivery_addresses());
    assert_eq!(plan.num_stops, 3);
    assert_eq!(plan.ordered_coordinates.len(), 3);

    // Two segments of 600 s raw at daytime 1.8 with the Bengaluru factor
    // 1.1, plus 1 min buffer each, plus 2 * 3 min handling time.
    let per_segment = 10.0 * (1.8 * 1.1) + 1.0;
    let expected = 2.0 * per_segment + 2.0 * 3.0;
    assert!(
        (plan.ors_duration_minutes - expected).abs() < 0.01,
        "expected {expected}, got {}",
        plan.ors_duration_minutes
    );
    assert!((plan.total_distance_km - 10.0).abs() < 1e-9);
    assert!(plan.route_geometry_geojson.is_some());
}

#[test]
fn fallback_eta_is_twenty_percent_over_duration() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    );

    let plan = planner.plan(&request(delivery_addresses()));
    let eta = plan.predicted_eta_minutes.unwrap();
    assert!((eta - plan.ors_duration_minutes * 1.2).abs() < 0.01);
    assert!(eta >= plan.ors_duration_minutes);
}

#[test]
fn matrix_outage_yields_empty_plan() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        OutageMatrix,
        ConstantDirections,
    );

    let plan = planner.plan(&request(delivery_addresses()));
    assert_eq!(plan, RoutePlan::empty());
    assert_eq!(plan.num_stops, 0);
    assert!(plan.predicted_eta_minutes.is_none());

    let err = planner.try_plan(&request(delivery_addresses())).unwrap_err();
    assert!(matches!(err, PlanError::MatrixUnavailable));
}

#[test]
fn unresolvable_address_aborts_request() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    );

    let mut addresses = delivery_addresses();
    addresses.push("no such place anywhere".to_string());
    let err = planner.try_plan(&request(addresses.clone())).unwrap_err();
    match err {
        PlanError::Resolution { address } => assert_eq!(address, "no such place anywhere"),
        other => panic!("expected resolution failure, got {other:?}"),
    }
    assert_eq!(planner.plan(&request(addresses)), RoutePlan::empty());
}

#[test]
fn literal_coordinates_plan_without_geocoding() {
    // Empty address book: only the literal parse can resolve these.
    let planner = Planner::new(
        resolver_with(BookGeocoder::new(&[])),
        HaversineMatrix::default(),
        ConstantDirections,
    );

    let plan = planner.plan(&request(vec![
        "12.9767,77.5713".to_string(),
        "12.9757,77.6066".to_string(),
    ]));
    assert_eq!(plan.num_stops, 2);
    assert!((plan.ordered_coordinates[0].lat - 12.9767).abs() < 1e-9);
}

#[test]
fn explicit_start_address_triggers_optimized_order() {
    let book: Vec<(&str, Coordinate)> = DELIVERY_STOPS
        .iter()
        .take(5)
        .map(|loc| (loc.name, loc.coord()))
        .collect();
    let addresses: Vec<String> = book.iter().map(|(name, _)| name.to_string()).collect();

    let planner = Planner::new(
        resolver_with(BookGeocoder::new(&book)),
        HaversineMatrix::default(),
        ConstantDirections,
    );

    let mut req = request(addresses.clone());
    req.vehicle_start_address = Some(addresses[2].clone());
    let plan = planner.plan(&req);

    assert_eq!(plan.num_stops, 5);
    assert_eq!(plan.ordered_addresses[0], addresses[2]);
    let mut sorted = plan.ordered_addresses.clone();
    sorted.sort();
    let mut expected = addresses.clone();
    expected.sort();
    assert_eq!(sorted, expected, "order must be a permutation of the input");
}

#[test]
fn implausible_prediction_is_clamped() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    )
    .with_predictor(Box::new(FixedPredictor(Some(100_000.0))));

    let plan = planner.plan(&request(delivery_addresses()));
    let eta = plan.predicted_eta_minutes.unwrap();
    assert!(eta <= plan.ors_duration_minutes * 2.0);
    assert!((eta - plan.ors_duration_minutes * 1.2).abs() < 0.01);
}

#[test]
fn plausible_prediction_is_used() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    )
    .with_predictor(Box::new(FixedPredictor(Some(55.0))));

    let plan = planner.plan(&request(delivery_addresses()));
    assert_eq!(plan.predicted_eta_minutes, Some(55.0));
}

#[test]
fn completed_route_reaches_sink_with_actual_duration() {
    let sink = RecordingSink::default();
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    )
    .with_sink(Box::new(sink.clone()));

    let plan = planner.plan(&request(delivery_addresses()));
    planner.record_completed(&plan, "2024-03-04T14:00:00", "2024-03-04T15:30:00");

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].num_stops, 3);
    assert_eq!(records[0].actual_duration_minutes, Some(90.0));
}

#[test]
fn sink_failure_is_swallowed() {
    let planner = Planner::new(
        resolver_with(delivery_geocoder()),
        HaversineMatrix::default(),
        ConstantDirections,
    )
    .with_sink(Box::new(RejectingSink));

    let plan = planner.plan(&request(delivery_addresses()));
    // Must not panic or propagate.
    planner.record_completed(&plan, "2024-03-04T14:00:00", "2024-03-04T15:30:00");
}
