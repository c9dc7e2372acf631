//! OpenRouteService HTTP adapters: geocoding, matrix, and directions.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::geometry::RouteGeometry;
use crate::traits::{
    Coordinate, CostMatrix, Directions, DirectionsProvider, Geocoder, MatrixProvider,
    ProviderError,
};

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Routing profile, e.g. "driving-car".
    pub profile: String,
    /// ISO country code for geocoding boundary filtering.
    pub boundary_country: String,
    pub geocode_timeout_secs: u64,
    pub matrix_timeout_secs: u64,
    pub directions_timeout_secs: u64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            profile: "driving-car".to_string(),
            boundary_country: "IN".to_string(),
            geocode_timeout_secs: 10,
            matrix_timeout_secs: 30,
            directions_timeout_secs: 45,
        }
    }
}

impl OrsConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

/// Blocking client for the three ORS endpoints the planner uses.
#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { config, client })
    }

    /// ORS wants [lon, lat] axis order.
    fn lon_lat_pairs(coords: &[Coordinate]) -> Vec<[f64; 2]> {
        coords.iter().map(|c| [c.lon, c.lat]).collect()
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ProviderError::Status(
                status.as_u16(),
                body.chars().take(200).collect(),
            ))
        }
    }
}

impl Geocoder for OrsClient {
    fn name(&self) -> &'static str {
        "ors"
    }

    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        let url = format!("{}/geocode/search", self.config.base_url);
        let response = self
            .client
            .get(url)
            .header("Authorization", &self.config.api_key)
            .query(&[
                ("text", address),
                ("boundary.country", self.config.boundary_country.as_str()),
                ("size", "5"),
                ("sources", "openstreetmap"),
            ])
            .timeout(Duration::from_secs(self.config.geocode_timeout_secs))
            .send()?;
        let body: GeocodeResponse = Self::check_status(response)?.json()?;

        if body.features.is_empty() {
            return Ok(None);
        }

        let best = pick_best_feature(address, &body.features)
            .or_else(|| body.features.first());
        let feature = match best {
            Some(feature) => feature,
            None => return Ok(None),
        };
        let coords = &feature.geometry.coordinates;
        if coords.len() < 2 {
            return Err(ProviderError::Malformed(
                "geocode feature missing coordinates".to_string(),
            ));
        }
        // GeoJSON point: [lon, lat].
        Ok(Coordinate::new(coords[1], coords[0]))
    }
}

impl MatrixProvider for OrsClient {
    fn matrix_for(&self, coords: &[Coordinate]) -> Result<CostMatrix, ProviderError> {
        let url = format!("{}/v2/matrix/{}", self.config.base_url, self.config.profile);
        let body = serde_json::json!({
            "locations": Self::lon_lat_pairs(coords),
            "metrics": ["distance", "duration"],
            "units": "km",
        });
        let response = self
            .client
            .post(url)
            .header("Authorization", &self.config.api_key)
            .json(&body)
            .timeout(Duration::from_secs(self.config.matrix_timeout_secs))
            .send()?;
        let body: MatrixResponse = Self::check_status(response)?.json()?;

        if body.distances.is_none() && body.durations.is_none() {
            return Err(ProviderError::Malformed(
                "matrix response carried neither distances nor durations".to_string(),
            ));
        }
        Ok(CostMatrix {
            distances_km: body.distances.unwrap_or_default(),
            durations_s: body.durations.unwrap_or_default(),
        })
    }
}

impl DirectionsProvider for OrsClient {
    fn directions_for(&self, coords: &[Coordinate]) -> Result<Directions, ProviderError> {
        let url = format!(
            "{}/v2/directions/{}/geojson",
            self.config.base_url, self.config.profile
        );
        let body = serde_json::json!({
            "coordinates": Self::lon_lat_pairs(coords),
            "units": "km",
        });
        let response = self
            .client
            .post(url)
            .header("Authorization", &self.config.api_key)
            .json(&body)
            .timeout(Duration::from_secs(self.config.directions_timeout_secs))
            .send()?;
        let body: DirectionsResponse = Self::check_status(response)?.json()?;

        let feature = body.features.into_iter().next().ok_or_else(|| {
            ProviderError::Malformed("directions response carried no features".to_string())
        })?;
        let summary = feature
            .pointer("/properties/summary")
            .cloned()
            .unwrap_or_default();
        let distance_km = summary
            .get("distance")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let duration_s = summary
            .get("duration")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        if summary.get("distance").is_none() {
            warn!("directions summary missing distance; treating as zero");
        }
        Ok(Directions {
            distance_km,
            duration_s,
            geometry: Some(RouteGeometry::new(feature)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeFeature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    layer: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

/// Scores a candidate by provider confidence, layer specificity, and
/// textual overlap with the query, picking the highest-scoring feature.
///
/// Returns `None` when no candidate scores above zero; the caller falls
/// back to the provider's first result.
fn pick_best_feature<'a>(
    query: &str,
    features: &'a [GeocodeFeature],
) -> Option<&'a GeocodeFeature> {
    let query_lower = query.to_lowercase();
    let mut best: Option<&GeocodeFeature> = None;
    let mut best_score = 0.0f64;

    for feature in features {
        let score = score_candidate(&query_lower, &feature.properties);
        if score > best_score {
            best_score = score;
            best = Some(feature);
        }
    }
    best
}

fn score_candidate(query_lower: &str, props: &FeatureProperties) -> f64 {
    let mut score = props.confidence;

    if props.name.to_lowercase().contains(query_lower)
        || props.label.to_lowercase().contains(query_lower)
    {
        score += 0.3;
    }

    score += match props.layer.as_str() {
        "address" => 0.2,
        "poi" => 0.15,
        "street" => 0.1,
        _ => 0.0,
    };

    if props.confidence > 0.8 {
        score += 0.2;
    } else if props.confidence > 0.6 {
        score += 0.1;
    }

    score
}
