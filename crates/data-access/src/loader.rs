//! Assembly of one variable: payload, coordinates and source layer.

use std::sync::Arc;

use grid_decoder::{decode_raw, GridPayload};
use projection::CoordinateField;
use scenario::{is_species_variable, species_tag, ScenarioVectors, SourceFeature, SourceLayer};
use tracing::{debug, warn};
use visor_common::CacheKey;
use visor_protocol::VisorApi;

use crate::config::DataAccessConfig;
use crate::error::{LoadError, Result};

/// Everything the display needs for one `(domain, instance, variable)`.
#[derive(Debug, Clone)]
pub struct VisorData {
    pub key: CacheKey,
    pub payload: GridPayload,
    /// Shared by every variable of the same domain and instance.
    pub coords: Arc<CoordinateField>,
    pub layer: SourceLayer,
    pub projects: Vec<String>,
    pub is_species: bool,
    /// Scenario a fresh session starts from.
    pub default_scenario: ScenarioVectors,
}

impl VisorData {
    /// Length of the (possibly expanded) source axis.
    pub fn source_axis_len(&self) -> usize {
        self.layer.axis_len()
    }

    pub fn to_lonlat(&self, x: f64, y: f64) -> (f64, f64) {
        self.coords.to_lonlat(x, y)
    }

    pub fn to_index(&self, lon: f64, lat: f64) -> (usize, usize) {
        self.coords.to_index(lon, lat)
    }
}

/// Fetch and decode a coordinate field.
pub async fn load_coordinates(
    api: &dyn VisorApi,
    domain: &str,
    instance: &str,
    coordx: &str,
    coordy: &str,
) -> Result<CoordinateField> {
    let lon = decode_raw(api.data(domain, instance, coordx).await?)?;
    let lat = decode_raw(api.data(domain, instance, coordy).await?)?;
    Ok(CoordinateField::build(&lon, &lat)?)
}

/// Fetch the sources of a species variable and lay out its source axis.
///
/// A failed or empty sources fetch keeps the payload's own axis.
pub async fn load_layer(api: &dyn VisorApi, key: &CacheKey, base_count: usize) -> SourceLayer {
    let tag = species_tag(key.variable());
    match api.sources(key.domain(), key.instance(), tag).await {
        Ok(collection) => {
            let sources = SourceFeature::from_collection(&collection, tag);
            if sources.is_empty() {
                debug!(key = %key, "No sources listed, keeping base axis");
                SourceLayer::base(base_count)
            } else {
                SourceLayer::from_sources(sources, base_count)
            }
        }
        Err(err) => {
            warn!(key = %key, error = %err, "Sources fetch failed, keeping base axis");
            SourceLayer::base(base_count)
        }
    }
}

/// Decode the variable payload and build the entry around the given
/// coordinate field.
pub async fn assemble(
    api: &dyn VisorApi,
    config: &DataAccessConfig,
    key: &CacheKey,
    payload: GridPayload,
    coords: Arc<CoordinateField>,
) -> VisorData {
    let is_species = is_species_variable(key.variable(), &config.species_pattern);
    let layer = if is_species {
        load_layer(api, key, payload.nv).await
    } else {
        SourceLayer::base(payload.nv)
    };
    let default_scenario =
        ScenarioVectors::with_defaults(layer.axis_len(), config.first_emission(is_species));
    let projects = layer.projects();

    VisorData {
        key: key.clone(),
        payload,
        coords,
        layer,
        projects,
        is_species,
        default_scenario,
    }
}

/// Fetch and decode the variable itself.
pub async fn load_payload(api: &dyn VisorApi, key: &CacheKey) -> Result<GridPayload> {
    let raw = api
        .data(key.domain(), key.instance(), key.variable())
        .await?;
    Ok(decode_raw(raw)?)
}

/// Coordinate variable names of a payload.
pub fn coordinate_names(payload: &GridPayload) -> Result<(String, String)> {
    payload
        .attributes
        .coordinate_names()
        .map(|(x, y)| (x.to_string(), y.to_string()))
        .ok_or_else(|| LoadError::MissingCoordinates(payload.variable.clone()))
}
