//! Route geometry payloads.
//!
//! The planner never interprets geometry; it carries the provider's GeoJSON
//! feature through to the response. Any decoding or rendering happens at
//! API boundaries, not within the planning core.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque GeoJSON payload describing a route's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteGeometry(Value);

impl RouteGeometry {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}
