//! GeoJSON types for `/api/sources` and the context `places`.
//!
//! Polygon coordinates are accepted either as standard GeoJSON rings or as a
//! single bare ring, since the backend emits both.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: SourceProperties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: SourceProperties) -> Self {
        Self {
            type_: "Feature".to_string(),
            geometry: Some(geometry),
            properties,
        }
    }
}

/// Supported geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: PolygonCoordinates },
}

impl Geometry {
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lon, lat],
        }
    }

    pub fn line_string(coordinates: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates }
    }

    pub fn polygon(exterior: Vec<[f64; 2]>) -> Self {
        Geometry::Polygon {
            coordinates: PolygonCoordinates::Rings(vec![exterior]),
        }
    }

    /// Vertex list as `(lon, lat)`; the exterior ring for polygons.
    pub fn lonlat_pairs(&self) -> Vec<(f64, f64)> {
        let pairs: &[[f64; 2]] = match self {
            Geometry::Point { coordinates } => std::slice::from_ref(coordinates),
            Geometry::LineString { coordinates } => coordinates,
            Geometry::Polygon { coordinates } => coordinates.exterior(),
        };
        pairs.iter().map(|[lon, lat]| (*lon, *lat)).collect()
    }
}

/// Polygon coordinates, nested rings or a bare exterior ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolygonCoordinates {
    Rings(Vec<Vec<[f64; 2]>>),
    Ring(Vec<[f64; 2]>),
}

impl PolygonCoordinates {
    pub fn exterior(&self) -> &[[f64; 2]] {
        match self {
            PolygonCoordinates::Rings(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
            PolygonCoordinates::Ring(ring) => ring,
        }
    }
}

/// Emission categories: one label or a list of labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmissionCategories {
    One(String),
    Many(Vec<String>),
}

impl EmissionCategories {
    /// Non-empty labels in order.
    pub fn labels(&self) -> Vec<String> {
        let all = match self {
            EmissionCategories::One(label) => vec![label.clone()],
            EmissionCategories::Many(labels) => labels.clone(),
        };
        all.into_iter().filter(|s| !s.trim().is_empty()).collect()
    }
}

/// Feature properties of an emission source. Unrecognized keys (such as a
/// place `name`) are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceProperties {
    /// External source identifier; the backend sends strings or numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emisid: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Position along the source axis of the raw buffer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_inner: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission: Option<EmissionCategories>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceProperties {
    /// `emisid` rendered as text.
    pub fn emisid_text(&self) -> String {
        match &self.emisid {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}
