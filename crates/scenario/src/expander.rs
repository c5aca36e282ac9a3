//! Expansion of sources into one row per emission category.

use serde::{Deserialize, Serialize};

use crate::sources::SourceFeature;

/// Category given to a source that lists none.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One (source, emission category) row of the expanded source axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedSource {
    /// Position along the expanded axis.
    pub new_inner_index: usize,
    /// Source-axis position of the raw plane this row reads.
    pub backing_inner_index: usize,
    pub emission_category: String,
    pub project_name: String,
    pub source_id: String,
}

/// Expand `sources` into one row per category.
///
/// Sources keep their input order and categories keep the order
/// `categories_of` yields them. A source with no categories gets a single
/// [`UNKNOWN_CATEGORY`] row. The result always has
/// `sum(max(1, categories))` rows numbered `0..N`.
pub fn expand<F>(sources: &[SourceFeature], categories_of: F) -> Vec<ExpandedSource>
where
    F: Fn(&SourceFeature) -> Vec<String>,
{
    let mut expanded = Vec::with_capacity(sources.len());
    for source in sources {
        let mut categories = categories_of(source);
        if categories.is_empty() {
            categories.push(UNKNOWN_CATEGORY.to_string());
        }
        for category in categories {
            expanded.push(ExpandedSource {
                new_inner_index: expanded.len(),
                backing_inner_index: source.inner_index,
                emission_category: category,
                project_name: source.project_name.clone(),
                source_id: source.source_id.clone(),
            });
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{listed_categories, GeometryKind};

    fn source(inner_index: usize, categories: &[&str]) -> SourceFeature {
        SourceFeature {
            source_id: format!("s{}", inner_index),
            project_name: "antucoya".to_string(),
            geometry_kind: GeometryKind::Point,
            coordinates: vec![(-69.8, -22.6)],
            inner_index,
            species_tag: "mp10".to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_expand_mixed() {
        let sources = vec![
            source(0, &["crushing", "transport"]),
            source(1, &[]),
            source(2, &["pit"]),
        ];
        let expanded = expand(&sources, listed_categories);
        let rows: Vec<(usize, usize, &str)> = expanded
            .iter()
            .map(|e| {
                (
                    e.new_inner_index,
                    e.backing_inner_index,
                    e.emission_category.as_str(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (0, 0, "crushing"),
                (1, 0, "transport"),
                (2, 1, "unknown"),
                (3, 2, "pit"),
            ]
        );
    }

    #[test]
    fn test_expand_empty() {
        assert!(expand(&[], listed_categories).is_empty());
    }

    #[test]
    fn test_custom_category_function() {
        let sources = vec![source(4, &["ignored"])];
        let expanded = expand(&sources, |_| vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(expanded.len(), 3);
        assert!(expanded.iter().all(|e| e.backing_inner_index == 4));
    }
}
