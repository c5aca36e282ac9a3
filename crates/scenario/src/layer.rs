//! The (possibly expanded) source axis of one payload.

use grid_decoder::{GridPayload, PlaneView};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use visor_common::FieldError;

use crate::expander::{expand, ExpandedSource};
use crate::sources::{listed_categories, SourceFeature};

/// Source axis of a payload, with the category expansion when sources
/// are known.
///
/// Without sources the axis is the payload's own source axis and index
/// `v` reads plane `v`. With sources, index `v` is an expanded row and
/// reads the plane of its backing source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLayer {
    sources: Vec<SourceFeature>,
    expanded: Vec<ExpandedSource>,
    base_count: usize,
}

/// Labels of one source-axis row, for tables and legends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub index: usize,
    pub project: String,
    pub source_id: String,
    pub category: String,
}

impl SourceLayer {
    /// The unexpanded axis of a payload with `base_count` sources.
    pub fn base(base_count: usize) -> Self {
        Self {
            sources: Vec::new(),
            expanded: Vec::new(),
            base_count,
        }
    }

    /// Expand `sources` over an axis of `base_count` raw planes.
    ///
    /// Sources whose index falls outside the raw axis are dropped.
    pub fn from_sources(sources: Vec<SourceFeature>, base_count: usize) -> Self {
        let (sources, stray): (Vec<_>, Vec<_>) = sources
            .into_iter()
            .partition(|s| s.inner_index < base_count);
        for source in &stray {
            warn!(
                source_id = %source.source_id,
                inner_index = source.inner_index,
                base_count,
                "Dropping source outside the source axis"
            );
        }
        let expanded = expand(&sources, listed_categories);
        debug!(
            sources = sources.len(),
            expanded = expanded.len(),
            base_count,
            "Expanded source axis"
        );
        Self {
            sources,
            expanded,
            base_count,
        }
    }

    pub fn sources(&self) -> &[SourceFeature] {
        &self.sources
    }

    pub fn expanded(&self) -> &[ExpandedSource] {
        &self.expanded
    }

    pub fn base_count(&self) -> usize {
        self.base_count
    }

    pub fn is_expanded(&self) -> bool {
        !self.expanded.is_empty()
    }

    /// Length of the source axis scenario vectors are indexed by.
    pub fn axis_len(&self) -> usize {
        if self.is_expanded() {
            self.expanded.len()
        } else {
            self.base_count
        }
    }

    /// Raw plane index read by axis index `v`.
    pub fn backing_index(&self, v: usize) -> Option<usize> {
        if self.is_expanded() {
            self.expanded.get(v).map(|e| e.backing_inner_index)
        } else {
            (v < self.base_count).then_some(v)
        }
    }

    /// Project of axis index `v`, empty when unknown.
    pub fn project_of(&self, v: usize) -> &str {
        if self.is_expanded() {
            return self
                .expanded
                .get(v)
                .map(|e| e.project_name.as_str())
                .unwrap_or("");
        }
        self.sources
            .iter()
            .find(|s| s.inner_index == v)
            .map(|s| s.project_name.as_str())
            .unwrap_or("")
    }

    /// Distinct project names in first-appearance order.
    pub fn projects(&self) -> Vec<String> {
        let mut projects: Vec<String> = Vec::new();
        for source in &self.sources {
            if !projects.contains(&source.project_name) {
                projects.push(source.project_name.clone());
            }
        }
        projects
    }

    /// Row labels along the axis.
    pub fn labels(&self) -> Vec<AxisLabel> {
        (0..self.axis_len())
            .map(|v| match self.expanded.get(v) {
                Some(e) => AxisLabel {
                    index: v,
                    project: e.project_name.clone(),
                    source_id: e.source_id.clone(),
                    category: e.emission_category.clone(),
                },
                None => AxisLabel {
                    index: v,
                    project: self.project_of(v).to_string(),
                    source_id: String::new(),
                    category: String::new(),
                },
            })
            .collect()
    }

    /// The `(y, x)` plane of axis index `v` at `(t, z)`.
    ///
    /// Expanded rows of one source share the same backing plane.
    pub fn remap<'a>(
        &self,
        payload: &'a GridPayload,
        t: usize,
        v: usize,
        z: usize,
    ) -> Result<PlaneView<'a>, FieldError> {
        let backing = self.backing_index(v).ok_or(FieldError::OutOfRange {
            what: "source",
            index: v,
            len: self.axis_len(),
        })?;
        Ok(payload.value_at(t, backing, z)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::GeometryKind;

    fn source(inner_index: usize, project: &str, categories: &[&str]) -> SourceFeature {
        SourceFeature {
            source_id: format!("s{}", inner_index),
            project_name: project.to_string(),
            geometry_kind: GeometryKind::Polygon,
            coordinates: vec![],
            inner_index,
            species_tag: "mp10".to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_base_layer() {
        let layer = SourceLayer::base(3);
        assert_eq!(layer.axis_len(), 3);
        assert_eq!(layer.backing_index(2), Some(2));
        assert_eq!(layer.backing_index(3), None);
        assert_eq!(layer.project_of(0), "");
        assert!(layer.projects().is_empty());
    }

    #[test]
    fn test_expanded_layer() {
        let layer = SourceLayer::from_sources(
            vec![
                source(0, "antucoya", &["crushing", "transport"]),
                source(1, "pelambres", &[]),
            ],
            2,
        );
        assert_eq!(layer.axis_len(), 3);
        assert_eq!(layer.backing_index(1), Some(0));
        assert_eq!(layer.backing_index(2), Some(1));
        assert_eq!(layer.project_of(2), "pelambres");
        assert_eq!(layer.projects(), vec!["antucoya", "pelambres"]);
        assert_eq!(layer.labels()[1].category, "transport");
    }

    #[test]
    fn test_stray_sources_are_dropped() {
        let layer = SourceLayer::from_sources(
            vec![source(0, "a", &[]), source(5, "b", &["x"])],
            1,
        );
        assert_eq!(layer.axis_len(), 1);
        assert_eq!(layer.projects(), vec!["a"]);
    }

    #[test]
    fn test_all_sources_stray_collapses_to_base() {
        let layer = SourceLayer::from_sources(vec![source(9, "a", &["x", "y"])], 2);
        assert!(!layer.is_expanded());
        assert_eq!(layer.axis_len(), 2);
    }
}
