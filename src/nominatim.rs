//! Nominatim fallback geocoder.
//!
//! Second link in the resolver chain: queried only when the primary
//! geocoder errors or returns nothing usable. Among results, finer-grained
//! OSM feature types (ways and nodes) with high importance win; otherwise
//! the first result is taken.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::traits::{Coordinate, Geocoder, ProviderError};

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Comma-separated ISO country codes for result filtering.
    pub country_codes: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "in".to_string(),
            user_agent: "route-planner/0.1".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }
}

impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        let url = format!("{}/search", self.config.base_url);
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "5"),
                ("addressdetails", "1"),
                ("countrycodes", self.config.country_codes.as_str()),
                ("extratags", "1"),
            ])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status(
                status.as_u16(),
                body.chars().take(200).collect(),
            ));
        }
        let results: Vec<SearchResult> = response.json()?;
        if results.is_empty() {
            return Ok(None);
        }

        let best = pick_best(&results);
        debug!(
            address,
            importance = best.importance,
            osm_type = %best.osm_type,
            display_name = %best.display_name,
            "nominatim candidate selected"
        );
        let lat: f64 = best
            .lat
            .parse()
            .map_err(|_| ProviderError::Malformed(format!("bad latitude '{}'", best.lat)))?;
        let lon: f64 = best
            .lon
            .parse()
            .map_err(|_| ProviderError::Malformed(format!("bad longitude '{}'", best.lon)))?;
        Ok(Coordinate::new(lat, lon))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    importance: f64,
    #[serde(default)]
    osm_type: String,
    #[serde(default)]
    display_name: String,
}

/// Prefers ways/nodes with importance above 0.5, then anything above 0.3,
/// then the first result.
fn pick_best(results: &[SearchResult]) -> &SearchResult {
    let mut fallback: Option<&SearchResult> = None;
    for result in results {
        if (result.osm_type == "way" || result.osm_type == "node") && result.importance > 0.5 {
            return result;
        }
        if fallback.is_none() && result.importance > 0.3 {
            fallback = Some(result);
        }
    }
    fallback.unwrap_or(&results[0])
}
