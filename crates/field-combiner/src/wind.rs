//! Wind glyphs from u/v component planes.

use grid_decoder::GridPayload;
use projection::CoordinateField;
use serde::{Deserialize, Serialize};
use visor_common::{FieldError, GridAttributes};

/// Speed at which glyphs reach full size, in m/s.
pub const DEFAULT_MAX_SPEED: f64 = 10.0;

const MIN_SCALE: f64 = 0.05;

/// One glyph at a grid node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindGlyph {
    pub lon: f64,
    pub lat: f64,
    /// Rotation in radians, `atan2(-u, -v)`.
    pub angle: f64,
    pub magnitude: f64,
    /// Relative size in `[0.05, 1]`.
    pub scale: f64,
}

impl WindGlyph {
    pub fn from_components(lon: f64, lat: f64, u: f64, v: f64, max_speed: f64) -> Self {
        let magnitude = u.hypot(v);
        let ratio = if max_speed > 0.0 {
            (magnitude / max_speed).min(1.0)
        } else {
            1.0
        };
        Self {
            lon,
            lat,
            angle: (-u).atan2(-v),
            magnitude,
            scale: MIN_SCALE + (1.0 - MIN_SCALE) * ratio,
        }
    }
}

/// `hypot(u.vmax, v.vmax)` when both components declare a `vmax`.
pub fn expected_max_speed(u_attrs: &GridAttributes, v_attrs: &GridAttributes) -> Option<f64> {
    Some(u_attrs.vmax?.hypot(v_attrs.vmax?))
}

/// One glyph per node of `coords` from the first source plane of the u
/// and v payloads at `(frame, level)`.
pub fn wind_glyphs(
    u: &GridPayload,
    v: &GridPayload,
    coords: &CoordinateField,
    frame: usize,
    level: usize,
    max_speed: f64,
) -> Result<Vec<WindGlyph>, FieldError> {
    let u_plane = u.value_at(frame, 0, level)?;
    let v_plane = v.value_at(frame, 0, level)?;
    let expected = coords.nx() * coords.ny();
    for len in [u_plane.len(), v_plane.len()] {
        if len != expected {
            return Err(FieldError::OutOfRange {
                what: "wind plane",
                index: len,
                len: expected,
            });
        }
    }

    Ok(u_plane
        .iter()
        .zip(v_plane.iter())
        .zip(coords.lon_values().iter().zip(coords.lat_values()))
        .map(|((u, v), (lon, lat))| WindGlyph::from_components(*lon, *lat, u, v, max_speed))
        .collect())
}
