//! Segment duration aggregation.
//!
//! For each consecutive pair in the tour, fetches point-to-point
//! directions, applies the traffic multiplier at the segment midpoint, and
//! adds a fixed per-segment buffer. Directions calls are independent, so
//! they run in parallel; each segment's contribution is computed on its
//! own and reduced afterwards. This is a linear one-way route model: no
//! return leg.

use chrono::{NaiveDateTime, Timelike};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::geometry::RouteGeometry;
use crate::traffic::TrafficModel;
use crate::traits::{Coordinate, DirectionsProvider, TrafficFeed};

/// Parking/signal allowance per driven segment, in minutes.
pub const SEGMENT_BUFFER_MINUTES: f64 = 1.0;

/// Fixed handling time per delivered stop, in minutes.
pub const HANDLING_MINUTES_PER_STOP: f64 = 3.0;

/// Accumulated totals for an ordered route.
#[derive(Debug, Clone, Default)]
pub struct RouteTotals {
    pub distance_km: f64,
    /// Traffic-adjusted driving time plus buffers and handling time.
    pub duration_minutes: f64,
    /// Full-route display geometry; absent when the directions provider
    /// could not supply one.
    pub geometry: Option<RouteGeometry>,
    /// Indices of segments whose directions call failed. Those segments
    /// contribute zero to the totals.
    pub failed_segments: Vec<usize>,
}

/// Sums traffic-adjusted segment durations and raw distances over the
/// ordered stops. With fewer than two stops the totals are zero.
pub fn aggregate<D>(
    directions: &D,
    traffic: &TrafficModel,
    feed: Option<&(dyn TrafficFeed + Sync)>,
    stops: &[Coordinate],
    start_time: NaiveDateTime,
) -> RouteTotals
where
    D: DirectionsProvider + Sync,
{
    if stops.len() < 2 {
        warn!(num_stops = stops.len(), "need at least 2 stops for route calculation");
        return RouteTotals::default();
    }

    let hour = start_time.hour();
    let outcomes: Vec<(usize, Option<(f64, f64)>)> = (0..stops.len() - 1)
        .into_par_iter()
        .map(|i| (i, segment_contribution(directions, traffic, feed, stops, i, hour)))
        .collect();

    let mut totals = RouteTotals::default();
    for (index, outcome) in outcomes {
        match outcome {
            Some((distance_km, adjusted_minutes)) => {
                totals.distance_km += distance_km;
                totals.duration_minutes += adjusted_minutes;
            }
            None => totals.failed_segments.push(index),
        }
    }

    let handling_minutes = (stops.len() - 1) as f64 * HANDLING_MINUTES_PER_STOP;
    totals.duration_minutes += handling_minutes;
    info!(
        num_stops = stops.len(),
        driving_minutes = totals.duration_minutes - handling_minutes,
        handling_minutes,
        distance_km = totals.distance_km,
        failed_segments = totals.failed_segments.len(),
        "route totals aggregated"
    );

    // Separate call purely for display geometry; failure is tolerated.
    match directions.directions_for(stops) {
        Ok(full_route) => totals.geometry = full_route.geometry,
        Err(err) => warn!(?err, "full-route geometry unavailable"),
    }

    totals
}

/// Raw distance (km) and traffic-adjusted duration (min) of one segment,
/// or `None` when its directions call failed.
fn segment_contribution<D>(
    directions: &D,
    traffic: &TrafficModel,
    feed: Option<&(dyn TrafficFeed + Sync)>,
    stops: &[Coordinate],
    index: usize,
    hour: u32,
) -> Option<(f64, f64)>
where
    D: DirectionsProvider + Sync,
{
    let from = stops[index];
    let to = stops[index + 1];
    let leg = match directions.directions_for(&[from, to]) {
        Ok(leg) => leg,
        Err(err) => {
            warn!(segment = index, ?err, "directions unavailable for segment");
            return None;
        }
    };

    let raw_minutes = leg.duration_s / 60.0;
    let midpoint = from.midpoint(&to);
    let multiplier = match feed.and_then(|f| f.multiplier_at(midpoint)) {
        Some(live) => {
            debug!(segment = index, multiplier = live, "using live traffic multiplier");
            live
        }
        None => traffic.multiplier(midpoint, hour, leg.distance_km),
    };
    let adjusted_minutes = raw_minutes * multiplier + SEGMENT_BUFFER_MINUTES;

    debug!(
        segment = index,
        distance_km = leg.distance_km,
        raw_minutes,
        multiplier,
        adjusted_minutes,
        "segment aggregated"
    );
    Some((leg.distance_km, adjusted_minutes))
}
