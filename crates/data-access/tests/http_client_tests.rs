//! HttpApiClient against an in-process axum backend.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use data_access::{DataAccessConfig, DataCache, HttpApiClient};
use serde_json::json;
use test_utils::names::*;
use test_utils::{coord_attrs, encode_f32, header_json, lonlat_grid, sample_sources, sequence};
use visor_common::FetchError;
use visor_protocol::{VisorApi, DATA_HEADER};

type Params = Query<HashMap<String, String>>;

async fn context() -> Json<serde_json::Value> {
    Json(json!({
        "hoursRun": 48,
        "startHour": 0,
        "endHour": 47,
        "optionLocalTime": true,
        "ref_dt": 60,
        "domains": [DOMAIN],
        "places": {"type": "FeatureCollection", "features": []},
        "pointSerieDefault": null
    }))
}

async fn instances(Query(params): Params) -> Response {
    match params.get("domain").map(String::as_str) {
        Some(DOMAIN) => Json(json!({
            "domain": DOMAIN,
            "instances": [INSTANCE, LATEST_INSTANCE]
        }))
        .into_response(),
        Some(OTHER_DOMAIN) => Json(json!({ "domain": OTHER_DOMAIN })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn variables(Query(params): Params) -> Response {
    if params.get("instance").map(String::as_str) == Some(INSTANCE) {
        Json(json!({ "variables": [SPECIES_VARIABLE, LON_VARIABLE, LAT_VARIABLE] }))
            .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn data(Query(params): Params) -> Response {
    let variable = params.get("variable").cloned().unwrap_or_default();
    let (lon, lat) = lonlat_grid(2, 2, -70.0, -23.0, 1.0, 1.0);
    let attrs = coord_attrs(LON_VARIABLE, LAT_VARIABLE);
    let (shape, values) = match variable.as_str() {
        SPECIES_VARIABLE => ([2, 2, 1, 2, 2], sequence(16)),
        LON_VARIABLE => ([1, 1, 1, 2, 2], lon),
        LAT_VARIABLE => ([1, 1, 1, 2, 2], lat),
        "no_header" => return encode_f32(&[1.0]).into_response(),
        "forbidden" => return StatusCode::FORBIDDEN.into_response(),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let header = header_json(&variable, shape, "float32", attrs);
    ([(DATA_HEADER, header)], encode_f32(&values)).into_response()
}

async fn sources(Query(params): Params) -> Response {
    if params.get("species").map(String::as_str) == Some("mp10") {
        Json(sample_sources()).into_response()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/context", get(context))
        .route("/api/instances/", get(instances))
        .route("/api/variables/", get(variables))
        .route("/api/data/", get(data))
        .route("/api/sources/", get(sources));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> HttpApiClient {
    HttpApiClient::new(&DataAccessConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: Some(5),
        ..Default::default()
    })
    .unwrap()
}

// ============================================================================
// Endpoints
// ============================================================================

#[tokio::test]
async fn test_context() {
    let api = client(&spawn_backend().await);
    let context = api.context().await.unwrap();
    assert_eq!(context.ref_dt, 60);
    assert_eq!(context.domains, vec![DOMAIN]);
    assert!(context.option_local_time);
    assert!(context.point_serie_default.is_none());
    assert!(context.instance_fallback.is_none());
}

#[tokio::test]
async fn test_option_lists() {
    let api = client(&spawn_backend().await);
    assert_eq!(
        api.instances(DOMAIN).await.unwrap(),
        Some(vec![INSTANCE.to_string(), LATEST_INSTANCE.to_string()])
    );
    assert_eq!(api.instances(OTHER_DOMAIN).await.unwrap(), None);
    assert_eq!(
        api.variables(DOMAIN, INSTANCE).await.unwrap().unwrap().len(),
        3
    );
}

#[tokio::test]
async fn test_data_reads_header_and_body() {
    let api = client(&spawn_backend().await);
    let raw = api.data(DOMAIN, INSTANCE, SPECIES_VARIABLE).await.unwrap();
    assert_eq!(raw.body.len(), 16 * 4);
    let header: serde_json::Value = serde_json::from_str(&raw.header).unwrap();
    assert_eq!(header["nv"], 2);
}

#[tokio::test]
async fn test_sources() {
    let api = client(&spawn_backend().await);
    let collection = api.sources(DOMAIN, INSTANCE, "mp10").await.unwrap();
    assert_eq!(collection.features.len(), 2);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_status_codes_map_to_fetch_errors() {
    let api = client(&spawn_backend().await);

    assert_eq!(
        api.instances("nowhere").await.unwrap_err(),
        FetchError::status(404, "instances")
    );
    assert_eq!(
        api.variables(DOMAIN, LATEST_INSTANCE).await.unwrap_err().http_status(),
        401
    );
    assert_eq!(
        api.data(DOMAIN, INSTANCE, "forbidden").await.unwrap_err().http_status(),
        403
    );
    assert_eq!(
        api.sources(DOMAIN, INSTANCE, "so2").await.unwrap_err().http_status(),
        400
    );
}

#[tokio::test]
async fn test_missing_data_header_is_invalid_body() {
    let api = client(&spawn_backend().await);
    let err = api.data(DOMAIN, INSTANCE, "no_header").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidBody(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{}", addr));
    let err = api.context().await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(err.http_status(), 500);
}

// ============================================================================
// Through the cache
// ============================================================================

#[tokio::test]
async fn test_cache_over_http() {
    let api = Arc::new(client(&spawn_backend().await));
    let cache = DataCache::new(api, DataAccessConfig::default());

    let data = cache.load(DOMAIN, INSTANCE, SPECIES_VARIABLE).await.unwrap();
    assert_eq!(data.payload.shape(), [2, 2, 1, 2, 2]);
    assert_eq!(data.source_axis_len(), 3);
    assert_eq!(data.to_index(-69.1, -22.1), (1, 1));

    assert!(cache.load(DOMAIN, INSTANCE, "forbidden").await.is_none());
}
