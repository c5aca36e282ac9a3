//! Source parsing, expansion and remapping over decoded payloads.

use grid_decoder::decode_raw;
use scenario::{expand, listed_categories, GeometryKind, SourceFeature, SourceLayer};
use serde_json::json;
use test_utils::{raw_grid_f32, sequence, sources_collection, SourceRow};
use visor_common::FieldError;
use visor_protocol::FeatureCollection;

fn rows() -> Vec<SourceRow<'static>> {
    vec![
        SourceRow {
            emisid: "chancado_1",
            project: "antucoya",
            id_inner: 0,
            categories: &["crushing", "transport"],
        },
        SourceRow {
            emisid: "botadero",
            project: "antucoya",
            id_inner: 1,
            categories: &[],
        },
        SourceRow {
            emisid: "rajo",
            project: "pelambres",
            id_inner: 2,
            categories: &["pit", "blasting", "haul_road"],
        },
    ]
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_collection() {
    let sources = SourceFeature::from_collection(&sources_collection(&rows()), "mp10");
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].source_id, "chancado_1");
    assert_eq!(sources[0].geometry_kind, GeometryKind::Point);
    assert_eq!(sources[2].inner_index, 2);
    assert_eq!(sources[2].species_tag, "mp10");
    assert_eq!(sources[1].categories, Vec::<String>::new());
}

#[test]
fn test_parse_mixed_geometries() {
    let collection: FeatureCollection = serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "LineString", "coordinates": [[-69.0, -22.0], [-69.1, -22.1]]},
             "properties": {"emisid": 3, "project": "a"}},
            {"type": "Feature", "geometry": null, "properties": {"emisid": "x"}},
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[-69.0, -22.0], [-69.2, -22.0], [-69.2, -22.2]]]},
             "properties": {"emisid": "p", "emission": "pit"}}
        ]
    }))
    .unwrap();
    let sources = SourceFeature::from_collection(&collection, "so2");
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].geometry_kind, GeometryKind::LineString);
    assert_eq!(sources[0].inner_index, 0);
    assert_eq!(sources[0].source_id, "3");
    assert_eq!(sources[1].geometry_kind, GeometryKind::Polygon);
    // position in the collection, the null-geometry feature still counts
    assert_eq!(sources[1].inner_index, 2);
    assert_eq!(sources[1].coordinates.len(), 3);
    assert_eq!(sources[1].project_name, "");
}

// ============================================================================
// Expansion totals
// ============================================================================

#[test]
fn test_expansion_totals_are_dense() {
    let category_counts: [&[usize]; 4] = [&[], &[0], &[2, 0, 1], &[3, 3, 0, 0, 5]];
    for counts in category_counts {
        let sources: Vec<SourceFeature> = counts
            .iter()
            .enumerate()
            .map(|(k, &n)| SourceFeature {
                source_id: format!("s{}", k),
                project_name: String::new(),
                geometry_kind: GeometryKind::Point,
                coordinates: vec![],
                inner_index: k,
                species_tag: "mp10".to_string(),
                categories: (0..n).map(|c| format!("c{}", c)).collect(),
            })
            .collect();
        let expanded = expand(&sources, listed_categories);
        let expected: usize = counts.iter().map(|&n| n.max(1)).sum();
        assert_eq!(expanded.len(), expected, "counts {:?}", counts);
        for (n, row) in expanded.iter().enumerate() {
            assert_eq!(row.new_inner_index, n);
        }
    }
}

// ============================================================================
// Remapping
// ============================================================================

#[test]
fn test_remap_aliases_backing_planes() {
    // nt=2, nv=3, nz=1, ny=1, nx=2
    let payload = decode_raw(raw_grid_f32(
        "mp10_hd_species",
        [2, 3, 1, 1, 2],
        &sequence(12),
        json!({}),
    ))
    .unwrap();
    let sources = SourceFeature::from_collection(&sources_collection(&rows()), "mp10");
    let layer = SourceLayer::from_sources(sources, payload.nv);
    assert_eq!(layer.axis_len(), 6);

    // rows 0 and 1 both read source 0
    let a = layer.remap(&payload, 1, 0, 0).unwrap().to_vec();
    let b = layer.remap(&payload, 1, 1, 0).unwrap().to_vec();
    assert_eq!(a, b);
    assert_eq!(a, vec![6.0, 7.0]);

    // row 2 is the uncategorised second source
    assert_eq!(layer.remap(&payload, 0, 2, 0).unwrap().to_vec(), vec![2.0, 3.0]);
    // rows 3..6 read source 2
    assert_eq!(layer.remap(&payload, 0, 5, 0).unwrap().to_vec(), vec![4.0, 5.0]);

    assert_eq!(
        layer.remap(&payload, 0, 6, 0).unwrap_err(),
        FieldError::OutOfRange {
            what: "source",
            index: 6,
            len: 6
        }
    );
    assert!(matches!(
        layer.remap(&payload, 2, 0, 0),
        Err(FieldError::Decode(_))
    ));
}

#[test]
fn test_projects_in_first_appearance_order() {
    let sources = SourceFeature::from_collection(&sources_collection(&rows()), "mp10");
    let layer = SourceLayer::from_sources(sources, 3);
    assert_eq!(layer.projects(), vec!["antucoya", "pelambres"]);
    assert_eq!(layer.project_of(2), "antucoya");
    assert_eq!(layer.project_of(3), "pelambres");
}

#[test]
fn test_empty_sources_keep_base_axis() {
    let layer = SourceLayer::from_sources(Vec::new(), 4);
    assert_eq!(layer.axis_len(), 4);
    assert!(!layer.is_expanded());
}
