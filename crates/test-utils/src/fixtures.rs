//! Common test fixtures for visor tests.

use serde_json::{json, Value};
use visor_protocol::geojson::EmissionCategories;
use visor_protocol::{
    ApiContext, Feature, FeatureCollection, Geometry, RawGrid, SourceProperties,
};

use crate::generators::{coord_attrs, lonlat_grid, raw_grid_f32, sequence};
use crate::mock_api::MockApi;

/// Domains and instances used across the suite.
pub mod names {
    pub const DOMAIN: &str = "antucoya";
    pub const OTHER_DOMAIN: &str = "pelambres";
    pub const INSTANCE: &str = "2025-07-24_00";
    pub const LATEST_INSTANCE: &str = "2025-07-25_00";
    pub const SPECIES_VARIABLE: &str = "mp10_hd_species";
    pub const PLAIN_VARIABLE: &str = "mp10_hd_conc";
    pub const LON_VARIABLE: &str = "mp10_hd_lon";
    pub const LAT_VARIABLE: &str = "mp10_hd_lat";
    pub const WIND_U: &str = "mp10_ld_u10";
    pub const WIND_V: &str = "mp10_ld_v10";
}

/// Grid size of [`sample_api`]: 3 columns by 2 rows.
pub const SAMPLE_NX: usize = 3;
pub const SAMPLE_NY: usize = 2;

/// Time steps of every [`sample_api`] variable.
pub const SAMPLE_NT: usize = 2;

/// `vmax` attribute on both [`sample_api`] wind components.
pub const SAMPLE_WIND_VMAX: f64 = 20.0;

/// A constant wind component over the [`sample_api`] grid, carrying
/// `vmax` the way the backend does.
pub fn wind_grid(variable: &str, value: f32) -> RawGrid {
    let mut attrs = coord_attrs(names::LON_VARIABLE, names::LAT_VARIABLE);
    attrs["vmax"] = json!(SAMPLE_WIND_VMAX);
    let len = SAMPLE_NT * SAMPLE_NY * SAMPLE_NX;
    raw_grid_f32(
        variable,
        [SAMPLE_NT, 1, 1, SAMPLE_NY, SAMPLE_NX],
        &vec![value; len],
        attrs,
    )
}

/// One emission source row for [`sources_collection`].
#[derive(Debug, Clone)]
pub struct SourceRow<'a> {
    pub emisid: &'a str,
    pub project: &'a str,
    pub id_inner: usize,
    pub categories: &'a [&'a str],
}

/// A point-source FeatureCollection with one feature per row.
pub fn sources_collection(rows: &[SourceRow<'_>]) -> FeatureCollection {
    rows.iter()
        .enumerate()
        .fold(FeatureCollection::new(), |fc, (n, row)| {
            let emission = match row.categories {
                [] => None,
                [one] => Some(EmissionCategories::One(one.to_string())),
                many => Some(EmissionCategories::Many(
                    many.iter().map(|s| s.to_string()).collect(),
                )),
            };
            let properties = SourceProperties {
                emisid: Some(Value::from(row.emisid)),
                project: Some(row.project.to_string()),
                id_inner: Some(row.id_inner),
                emission,
                extra: Default::default(),
            };
            fc.with_feature(Feature::new(
                Geometry::point(-69.8 + n as f64 * 0.01, -22.6),
                properties,
            ))
        })
}

/// A context as the backend would send it.
pub fn sample_context() -> ApiContext {
    serde_json::from_value(json!({
        "hoursRun": 168,
        "startHour": 4,
        "endHour": 167,
        "optionLocalTime": false,
        "ref_dt": 15,
        "domains": [names::DOMAIN, names::OTHER_DOMAIN],
        "places": {"type": "FeatureCollection", "features": []},
        "pointSerieDefault": {"lon": -69.9, "lat": -22.9},
        "auxiliaryVairbales": {"default": names::SPECIES_VARIABLE}
    }))
    .expect("valid context fixture")
}

/// Sources of the species variable on the latest antucoya instance: one
/// source with two categories and one without.
pub fn sample_sources() -> FeatureCollection {
    sources_collection(&[
        SourceRow {
            emisid: "chancado_1",
            project: "mina_norte",
            id_inner: 0,
            categories: &["crushing", "transport"],
        },
        SourceRow {
            emisid: "botadero",
            project: "mina_sur",
            id_inner: 1,
            categories: &[],
        },
    ])
}

/// A backend with two domains on a regular 3x2 grid.
///
/// - `antucoya` has instances `INSTANCE` and `LATEST_INSTANCE`.
///   The latest carries the species variable (two sources, expanded to
///   three rows), the plain variable, wind components and coordinates.
///   The older one carries the plain variable and coordinates only.
/// - `pelambres` has `INSTANCE` only, with a species variable whose
///   sources are missing.
pub fn sample_api() -> MockApi {
    use crate::fixtures::names::*;

    let [nt, nx, ny] = [SAMPLE_NT, SAMPLE_NX, SAMPLE_NY];
    let plane = nx * ny;
    let (lon, lat) = lonlat_grid(nx, ny, -70.0, -23.0, 0.5, 0.5);
    let attrs = || coord_attrs(LON_VARIABLE, LAT_VARIABLE);
    let coords = |api: MockApi, domain: &str, instance: &str| {
        api.with_grid(
            domain,
            instance,
            LON_VARIABLE,
            raw_grid_f32(LON_VARIABLE, [1, 1, 1, ny, nx], &lon, attrs()),
        )
        .with_grid(
            domain,
            instance,
            LAT_VARIABLE,
            raw_grid_f32(LAT_VARIABLE, [1, 1, 1, ny, nx], &lat, attrs()),
        )
    };
    let species = raw_grid_f32(
        SPECIES_VARIABLE,
        [nt, 2, 1, ny, nx],
        &sequence(nt * 2 * plane),
        attrs(),
    );
    let plain = raw_grid_f32(PLAIN_VARIABLE, [nt, 1, 1, ny, nx], &sequence(nt * plane), attrs());
    let wind_u = wind_grid(WIND_U, 3.0);
    let wind_v = wind_grid(WIND_V, 4.0);

    let api = MockApi::new()
        .with_context(sample_context())
        .with_instances(DOMAIN, &[INSTANCE, LATEST_INSTANCE])
        .with_instances(OTHER_DOMAIN, &[INSTANCE])
        .with_variables(
            DOMAIN,
            LATEST_INSTANCE,
            &[SPECIES_VARIABLE, PLAIN_VARIABLE, WIND_U, WIND_V, LON_VARIABLE, LAT_VARIABLE],
        )
        .with_variables(DOMAIN, INSTANCE, &[PLAIN_VARIABLE, LON_VARIABLE, LAT_VARIABLE])
        .with_variables(
            OTHER_DOMAIN,
            INSTANCE,
            &[SPECIES_VARIABLE, LON_VARIABLE, LAT_VARIABLE],
        )
        .with_grid(DOMAIN, LATEST_INSTANCE, SPECIES_VARIABLE, species.clone())
        .with_grid(DOMAIN, LATEST_INSTANCE, PLAIN_VARIABLE, plain.clone())
        .with_grid(DOMAIN, LATEST_INSTANCE, WIND_U, wind_u)
        .with_grid(DOMAIN, LATEST_INSTANCE, WIND_V, wind_v)
        .with_grid(DOMAIN, INSTANCE, PLAIN_VARIABLE, plain)
        .with_grid(OTHER_DOMAIN, INSTANCE, SPECIES_VARIABLE, species)
        .with_sources(DOMAIN, LATEST_INSTANCE, "mp10", sample_sources());
    let api = coords(api, DOMAIN, LATEST_INSTANCE);
    let api = coords(api, DOMAIN, INSTANCE);
    coords(api, OTHER_DOMAIN, INSTANCE)
}
