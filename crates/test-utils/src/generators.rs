//! Generators for synthetic grid responses.
//!
//! Buffers are little-endian, matching what the backend writes.

use bytes::Bytes;
use half::f16;
use serde_json::{json, Value};
use visor_protocol::RawGrid;

/// Encode samples as float32.
pub fn encode_f32(values: &[f32]) -> Bytes {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    Bytes::from(out)
}

/// Encode samples as float16, rounding to the nearest half value.
pub fn encode_f16(values: &[f32]) -> Bytes {
    let mut out = Vec::with_capacity(values.len() * 2);
    for v in values {
        out.extend_from_slice(&f16::from_f32(*v).to_le_bytes());
    }
    Bytes::from(out)
}

/// Encode samples as uint8.
pub fn encode_u8(values: &[u8]) -> Bytes {
    Bytes::copy_from_slice(values)
}

/// JSON `X-Header` for a shape `(nt, nv, nz, ny, nx)`.
pub fn header_json(variable: &str, shape: [usize; 5], compress: &str, attrs: Value) -> String {
    let [nt, nv, nz, ny, nx] = shape;
    json!({
        "variable": variable,
        "nt": nt,
        "nv": nv,
        "nz": nz,
        "ny": ny,
        "nx": nx,
        "attrs": attrs,
        "compress": compress,
    })
    .to_string()
}

/// Attributes naming the coordinate variables.
pub fn coord_attrs(coordx: &str, coordy: &str) -> Value {
    json!({ "coordx": coordx, "coordy": coordy, "unit": "ug/m3" })
}

/// A float32 `/api/data` response.
pub fn raw_grid_f32(variable: &str, shape: [usize; 5], values: &[f32], attrs: Value) -> RawGrid {
    RawGrid {
        body: encode_f32(values),
        header: header_json(variable, shape, "float32", attrs),
    }
}

/// Regular lon/lat node arrays, row-major `(ny, nx)`:
/// `lon[j][i] = lon0 + i * dlon`, `lat[j][i] = lat0 + j * dlat`.
pub fn lonlat_grid(
    nx: usize,
    ny: usize,
    lon0: f32,
    lat0: f32,
    dlon: f32,
    dlat: f32,
) -> (Vec<f32>, Vec<f32>) {
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            lon.push(lon0 + i as f32 * dlon);
            lat.push(lat0 + j as f32 * dlat);
        }
    }
    (lon, lat)
}

/// Sheared lon/lat node arrays: each row is shifted east by `shear` degrees
/// per row, so grid lines are not aligned with meridians.
pub fn sheared_lonlat_grid(
    nx: usize,
    ny: usize,
    lon0: f32,
    lat0: f32,
    step: f32,
    shear: f32,
) -> (Vec<f32>, Vec<f32>) {
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            lon.push(lon0 + i as f32 * step + j as f32 * shear);
            lat.push(lat0 + j as f32 * step);
        }
    }
    (lon, lat)
}

/// `0, 1, 2, ...` as float32 samples.
pub fn sequence(len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32).collect()
}
