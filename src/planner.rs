//! Request orchestration: resolve → matrix → order → aggregate → blend.
//!
//! A `Planner` owns its providers; nothing is looked up from ambient
//! globals, so the whole pipeline runs against injected fakes in tests.
//! Each request owns its own stop set, matrix, and accumulators; the
//! planner holds no mutable state and is safely reentrant.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::eta::{self, RouteFeatures};
use crate::geocode::AddressResolver;
use crate::geometry::RouteGeometry;
use crate::segments;
use crate::traffic::TrafficModel;
use crate::traits::{
    CompletedRouteSink, Coordinate, DirectionsProvider, EtaPredictor, MatrixProvider,
    TrafficFeed,
};

/// A route-planning request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    /// Stop addresses in intended visiting order; free text or "lat,lon".
    pub addresses: Vec<String>,
    /// ISO-8601 start time; defaults to now.
    pub start_time: Option<String>,
    /// Explicit start address; defaults to the first address.
    pub vehicle_start_address: Option<String>,
}

/// The planned route. Numeric fields are rounded at this boundary only
/// (2 decimals for minutes, 3 for kilometres); internal computation keeps
/// full precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub ordered_addresses: Vec<String>,
    pub ordered_coordinates: Vec<Coordinate>,
    pub ors_duration_minutes: f64,
    pub total_distance_km: f64,
    pub num_stops: usize,
    pub predicted_eta_minutes: Option<f64>,
    pub route_geometry_geojson: Option<RouteGeometry>,
}

impl RoutePlan {
    /// The failure response: no stops, no prediction, nothing partial.
    pub fn empty() -> Self {
        Self {
            ordered_addresses: Vec::new(),
            ordered_coordinates: Vec::new(),
            ors_duration_minutes: 0.0,
            total_distance_km: 0.0,
            num_stops: 0,
            predicted_eta_minutes: None,
            route_geometry_geojson: None,
        }
    }
}

/// Timing fields of a finished route, handed to the training sink.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedRoute {
    pub start_time: String,
    pub end_time: String,
    pub ors_duration_minutes: f64,
    pub total_distance_km: f64,
    pub num_stops: usize,
    /// Wall-clock duration derived from the timestamps, when both parse.
    pub actual_duration_minutes: Option<f64>,
}

/// Why a planning request produced an empty plan.
#[derive(Debug)]
pub enum PlanError {
    /// The request carried no addresses.
    NoAddresses,
    /// An address failed every resolution strategy.
    Resolution { address: String },
    /// The matrix provider errored or returned an unusable matrix.
    MatrixUnavailable,
}

pub struct Planner<M, D> {
    resolver: AddressResolver,
    matrix: M,
    directions: D,
    traffic: TrafficModel,
    traffic_feed: Option<Box<dyn TrafficFeed + Send + Sync>>,
    predictor: Option<Box<dyn EtaPredictor + Send + Sync>>,
    sink: Option<Box<dyn CompletedRouteSink + Send + Sync>>,
}

impl<M, D> Planner<M, D>
where
    M: MatrixProvider,
    D: DirectionsProvider + Sync,
{
    pub fn new(resolver: AddressResolver, matrix: M, directions: D) -> Self {
        Self {
            resolver,
            matrix,
            directions,
            traffic: TrafficModel::default(),
            traffic_feed: None,
            predictor: None,
            sink: None,
        }
    }

    pub fn with_traffic_model(mut self, traffic: TrafficModel) -> Self {
        self.traffic = traffic;
        self
    }

    pub fn with_traffic_feed(mut self, feed: Box<dyn TrafficFeed + Send + Sync>) -> Self {
        self.traffic_feed = Some(feed);
        self
    }

    pub fn with_predictor(mut self, predictor: Box<dyn EtaPredictor + Send + Sync>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn CompletedRouteSink + Send + Sync>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Plans a route, mapping any hard failure to the empty plan.
    pub fn plan(&self, request: &PlanRequest) -> RoutePlan {
        match self.try_plan(request) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(?err, "planning failed; returning empty plan");
                RoutePlan::empty()
            }
        }
    }

    /// Plans a route, surfacing the failure taxonomy to the caller.
    pub fn try_plan(&self, request: &PlanRequest) -> Result<RoutePlan, PlanError> {
        if request.addresses.is_empty() {
            return Err(PlanError::NoAddresses);
        }

        // 1) Resolve every address; any failure aborts the request.
        let mut coords: Vec<Coordinate> = Vec::with_capacity(request.addresses.len());
        for address in &request.addresses {
            match self.resolver.resolve(address) {
                Some(coord) => coords.push(coord),
                None => {
                    return Err(PlanError::Resolution {
                        address: address.clone(),
                    });
                }
            }
        }

        let start_index = request
            .vehicle_start_address
            .as_deref()
            .and_then(|start| request.addresses.iter().position(|a| a == start))
            .unwrap_or(0);
        debug!(start_index, "declared route start");

        // 2) Pairwise cost matrix; provider failure aborts the request.
        let matrix = self.matrix.matrix_for(&coords).map_err(|err| {
            warn!(?err, "cost matrix unavailable");
            PlanError::MatrixUnavailable
        })?;
        if matrix.len() != coords.len() {
            warn!(
                expected = coords.len(),
                got = matrix.len(),
                "cost matrix has wrong dimensions"
            );
            return Err(PlanError::MatrixUnavailable);
        }

        // 3) Visiting order.
        let order = crate::tour::plan_order(&matrix, start_index);
        let ordered_addresses: Vec<String> = order
            .iter()
            .map(|&i| request.addresses[i].clone())
            .collect();
        let ordered_coords: Vec<Coordinate> = order.iter().map(|&i| coords[i]).collect();

        // 4) Traffic-adjusted totals over the ordered segments.
        let start_time = parse_start_time(request.start_time.as_deref());
        let feed: Option<&(dyn TrafficFeed + Sync)> = match &self.traffic_feed {
            Some(feed) => Some(feed.as_ref()),
            None => None,
        };
        let totals = segments::aggregate(
            &self.directions,
            &self.traffic,
            feed,
            &ordered_coords,
            start_time,
        );

        // 5) Blend with the correction model (or its fallback).
        let features = RouteFeatures::new(
            totals.duration_minutes,
            totals.distance_km,
            ordered_addresses.len(),
            start_time,
        );
        let predictor: Option<&dyn EtaPredictor> = match &self.predictor {
            Some(predictor) => Some(predictor.as_ref()),
            None => None,
        };
        let predicted_eta = eta::blend(predictor, &features);

        info!(
            num_stops = ordered_addresses.len(),
            duration_minutes = totals.duration_minutes,
            distance_km = totals.distance_km,
            predicted_eta,
            "route planned"
        );

        Ok(RoutePlan {
            num_stops: ordered_addresses.len(),
            ordered_addresses,
            ordered_coordinates: ordered_coords,
            ors_duration_minutes: round2(totals.duration_minutes),
            total_distance_km: round3(totals.distance_km),
            predicted_eta_minutes: Some(round2(predicted_eta)),
            route_geometry_geojson: totals.geometry,
        })
    }

    /// Forwards a finished route to the training sink, fire-and-forget.
    ///
    /// Sink failure is logged and swallowed; it never affects the caller.
    pub fn record_completed(&self, plan: &RoutePlan, start_time: &str, end_time: &str) {
        let actual_duration_minutes = try_parse_time(start_time)
            .zip(try_parse_time(end_time))
            .map(|(start, end)| (end - start).num_seconds() as f64 / 60.0);

        let record = CompletedRoute {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            ors_duration_minutes: plan.ors_duration_minutes,
            total_distance_km: plan.total_distance_km,
            num_stops: plan.num_stops,
            actual_duration_minutes,
        };

        match &self.sink {
            Some(sink) => {
                if let Err(err) = sink.record(&record) {
                    warn!(?err, "completed-route sink rejected record");
                }
            }
            None => debug!("no completed-route sink configured"),
        }
    }
}

/// Parses an ISO-8601 timestamp, with or without an offset. Unparseable
/// or missing values fall back to the current local time.
fn parse_start_time(value: Option<&str>) -> NaiveDateTime {
    match value {
        Some(raw) => try_parse_time(raw).unwrap_or_else(|| {
            warn!(raw, "unparseable start time; using current time");
            Local::now().naive_local()
        }),
        None => Local::now().naive_local(),
    }
}

fn try_parse_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
