//! Emission sources parsed from the `/api/sources` GeoJSON.

use serde::{Deserialize, Serialize};
use tracing::warn;
use visor_protocol::{FeatureCollection, Geometry};

/// Geometry kind of an emission source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    pub fn of(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
        }
    }
}

/// One emission source from a sources fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFeature {
    pub source_id: String,
    pub project_name: String,
    pub geometry_kind: GeometryKind,
    /// Vertices as `(lon, lat)`; the exterior ring for polygons.
    pub coordinates: Vec<(f64, f64)>,
    /// Position along the source axis of the raw buffer.
    pub inner_index: usize,
    pub species_tag: String,
    /// Emission categories listed on the feature, possibly empty.
    pub categories: Vec<String>,
}

impl SourceFeature {
    /// Parse every feature of a sources collection, in collection order.
    ///
    /// Features without geometry are skipped. A feature without `id_inner`
    /// takes its position in the collection.
    pub fn from_collection(collection: &FeatureCollection, species_tag: &str) -> Vec<Self> {
        collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(position, feature)| {
                let Some(geometry) = feature.geometry.as_ref() else {
                    warn!(position, "Skipping source feature without geometry");
                    return None;
                };
                let props = &feature.properties;
                Some(SourceFeature {
                    source_id: props.emisid_text(),
                    project_name: props.project.clone().unwrap_or_default(),
                    geometry_kind: GeometryKind::of(geometry),
                    coordinates: geometry.lonlat_pairs(),
                    inner_index: props.id_inner.unwrap_or(position),
                    species_tag: species_tag.to_string(),
                    categories: props
                        .emission
                        .as_ref()
                        .map(|e| e.labels())
                        .unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Categories listed on the source itself.
pub fn listed_categories(source: &SourceFeature) -> Vec<String> {
    source.categories.clone()
}

/// Species tag of a variable: the name up to the first `_`.
pub fn species_tag(variable: &str) -> &str {
    variable.split('_').next().unwrap_or(variable)
}

/// Whether a variable aggregates over emission sources.
pub fn is_species_variable(variable: &str, pattern: &str) -> bool {
    !pattern.is_empty() && variable.contains(pattern)
}

/// Table label for a snake_case identifier: `"open_pit"` becomes `"Open Pit"`.
pub fn display_label(text: &str) -> String {
    text.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
