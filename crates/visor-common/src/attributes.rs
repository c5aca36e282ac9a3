//! Typed view over the free-form `attrs` bag carried in a grid header.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recognized grid attributes plus a pass-through bag for everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridAttributes {
    /// Physical units label (e.g. "µg/m³").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Name of the longitude coordinate variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordx: Option<String>,

    /// Name of the latitude coordinate variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordy: Option<String>,

    /// Contour thresholds for the colour scale.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thresholds: Vec<f64>,

    /// Time step in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,

    /// Velocity-scale hint for wind components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmax: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GridAttributes {
    /// Units label, empty when the backend sent none.
    pub fn unit_or_empty(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }

    /// Both coordinate variable names, if the header names them.
    pub fn coordinate_names(&self) -> Option<(&str, &str)> {
        match (self.coordx.as_deref(), self.coordy.as_deref()) {
            (Some(x), Some(y)) if !x.is_empty() && !y.is_empty() => Some((x, y)),
            _ => None,
        }
    }
}
