//! ETA blending: learned correction with a heuristic safety net.
//!
//! When a duration-correction model is available its prediction is used,
//! unless it is implausibly large (more than twice the aggregated
//! duration). Without a model, or on any prediction failure, a flat 20%
//! traffic buffer applies.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{info, warn};

use crate::traits::EtaPredictor;

/// Flat buffer applied when no usable prediction exists.
pub const FALLBACK_BUFFER: f64 = 1.2;

/// Predictions above this multiple of the aggregated duration are
/// discarded as implausible.
pub const IMPLAUSIBILITY_FACTOR: f64 = 2.0;

/// Time-of-day band used as a one-hot model feature.
///
/// Bands match the columns the correction model was trained on; they are
/// deliberately different from the traffic model's multiplier bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    EveningRush,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=10 => TimeOfDay::Morning,
            11..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::EveningRush,
            _ => TimeOfDay::Night,
        }
    }
}

/// Feature vector handed to the duration-correction predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFeatures {
    pub duration_minutes: f64,
    pub distance_km: f64,
    pub num_stops: usize,
    pub time_of_day: TimeOfDay,
    pub weekend: bool,
}

impl RouteFeatures {
    pub fn new(
        duration_minutes: f64,
        distance_km: f64,
        num_stops: usize,
        start_time: NaiveDateTime,
    ) -> Self {
        Self {
            duration_minutes,
            distance_km,
            num_stops,
            time_of_day: TimeOfDay::from_hour(start_time.hour()),
            weekend: start_time.weekday().num_days_from_monday() >= 5,
        }
    }
}

/// Final predicted route duration in minutes. Always defined.
pub fn blend(predictor: Option<&dyn EtaPredictor>, features: &RouteFeatures) -> f64 {
    let fallback = features.duration_minutes * FALLBACK_BUFFER;
    match predictor.and_then(|p| p.predict(features)) {
        Some(prediction) => {
            if prediction > features.duration_minutes * IMPLAUSIBILITY_FACTOR {
                warn!(
                    prediction,
                    aggregated = features.duration_minutes,
                    "prediction implausibly high; using buffered fallback"
                );
                fallback
            } else {
                info!(prediction, aggregated = features.duration_minutes, "using model prediction");
                prediction
            }
        }
        None => {
            info!(eta = fallback, "no usable prediction; using buffered fallback");
            fallback
        }
    }
}
