//! Session context and option-list responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geojson::FeatureCollection;

/// Instance used when the instance list cannot be fetched and the context
/// itself came from [`ApiContext::fallback`].
pub const FALLBACK_INSTANCE: &str = "1949-01-05_00";

/// Default series location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDefault {
    pub lon: f64,
    pub lat: f64,
}

/// Response of `GET /api/context`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContext {
    pub hours_run: i64,
    pub start_hour: i64,
    pub end_hour: i64,
    pub option_local_time: bool,

    /// Frame step in minutes.
    #[serde(rename = "ref_dt")]
    pub ref_dt: u32,

    pub domains: Vec<String>,

    #[serde(default)]
    pub places: FeatureCollection,

    #[serde(default)]
    pub point_serie_default: Option<PointDefault>,

    #[serde(default)]
    pub variable_selector: Option<Value>,

    // The backend spells it this way.
    #[serde(default, rename = "auxiliaryVairbales")]
    pub auxiliary_variables: Option<Value>,

    /// Sentinel instance offered when instance listing fails. Only set on the
    /// fallback context.
    #[serde(skip)]
    pub instance_fallback: Option<String>,
}

impl ApiContext {
    /// Context used when `/api/context` is unreachable.
    pub fn fallback() -> Self {
        Self {
            hours_run: 24,
            start_hour: 0,
            end_hour: 24,
            option_local_time: false,
            ref_dt: 15,
            domains: vec!["northamerica".to_string()],
            places: FeatureCollection::default(),
            point_serie_default: None,
            variable_selector: None,
            auxiliary_variables: None,
            instance_fallback: Some(FALLBACK_INSTANCE.to_string()),
        }
    }

    /// `auxiliaryVairbales.default`, when it names a variable.
    pub fn default_variable(&self) -> Option<&str> {
        self.auxiliary_variables
            .as_ref()?
            .get("default")?
            .as_str()
            .filter(|s| !s.is_empty())
    }
}

/// Response of `GET /api/instances/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstancesResponse {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub instances: Option<Vec<String>>,
}

/// Response of `GET /api/variables/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariablesResponse {
    #[serde(default)]
    pub variables: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_context() {
        let json = r#"{
            "hoursRun": 168, "startHour": 4, "endHour": 167,
            "optionLocalTime": true, "ref_dt": 15,
            "domains": ["antucoya", "pelambres"],
            "places": {"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-69.666, -22.35]},
                 "properties": {"name": "Maria Elena"}}
            ]},
            "pointSerieDefault": {"lon": -69.666, "lat": -22.35},
            "auxiliaryVairbales": {"default": "mp10_hd_species"}
        }"#;
        let ctx: ApiContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.hours_run, 168);
        assert_eq!(ctx.ref_dt, 15);
        assert_eq!(ctx.domains, vec!["antucoya", "pelambres"]);
        assert_eq!(ctx.places.features.len(), 1);
        assert_eq!(ctx.point_serie_default.unwrap().lat, -22.35);
        assert_eq!(ctx.default_variable(), Some("mp10_hd_species"));
        assert!(ctx.instance_fallback.is_none());
    }

    #[test]
    fn test_fallback_context() {
        let ctx = ApiContext::fallback();
        assert_eq!(ctx.domains, vec!["northamerica"]);
        assert_eq!(ctx.ref_dt, 15);
        assert_eq!(ctx.instance_fallback.as_deref(), Some(FALLBACK_INSTANCE));
        assert_eq!(ctx.default_variable(), None);
    }

    #[test]
    fn test_instances_without_list() {
        let resp: InstancesResponse = serde_json::from_str(r#"{"domain": "x"}"#).unwrap();
        assert!(resp.instances.is_none());
    }
}
