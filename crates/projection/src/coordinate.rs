//! Queryable lon/lat field over grid nodes.

use grid_decoder::GridPayload;
use tracing::debug;
use visor_common::ProjectionError;

use crate::interpolation::bilinear_interpolate;

/// Node longitudes and latitudes of a model grid, row-major `(ny, nx)`.
///
/// Built once per domain/instance and shared by every variable on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateField {
    nx: usize,
    ny: usize,
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl CoordinateField {
    /// Build from the decoded longitude and latitude variables.
    ///
    /// Only the first `(y, x)` plane of each payload is used; coordinate
    /// variables do not vary in time or level.
    pub fn build(lon_grid: &GridPayload, lat_grid: &GridPayload) -> Result<Self, ProjectionError> {
        if lon_grid.nx != lat_grid.nx || lon_grid.ny != lat_grid.ny {
            return Err(ProjectionError::ShapeMismatch {
                lon_nx: lon_grid.nx,
                lon_ny: lon_grid.ny,
                lat_nx: lat_grid.nx,
                lat_ny: lat_grid.ny,
            });
        }
        if lon_grid.plane_len() == 0 {
            return Err(ProjectionError::EmptyGrid);
        }
        let lon = lon_grid.value_at(0, 0, 0)?.to_vec();
        let lat = lat_grid.value_at(0, 0, 0)?.to_vec();
        debug!(
            lon_variable = %lon_grid.variable,
            lat_variable = %lat_grid.variable,
            nx = lon_grid.nx,
            ny = lon_grid.ny,
            "Built coordinate field"
        );
        Self::from_arrays(lon_grid.nx, lon_grid.ny, lon, lat)
    }

    /// Build from node arrays already in memory.
    pub fn from_arrays(
        nx: usize,
        ny: usize,
        lon: Vec<f64>,
        lat: Vec<f64>,
    ) -> Result<Self, ProjectionError> {
        if nx == 0 || ny == 0 {
            return Err(ProjectionError::EmptyGrid);
        }
        if lon.len() != nx * ny || lat.len() != nx * ny {
            return Err(ProjectionError::ShapeMismatch {
                lon_nx: lon.len(),
                lon_ny: 1,
                lat_nx: lat.len(),
                lat_ny: 1,
            });
        }
        Ok(Self { nx, ny, lon, lat })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn lon_values(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat_values(&self) -> &[f64] {
        &self.lat
    }

    /// Coordinates of node `(i, j)`, `None` outside the grid.
    pub fn node(&self, i: usize, j: usize) -> Option<(f64, f64)> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        let idx = j * self.nx + i;
        Some((self.lon[idx], self.lat[idx]))
    }

    /// Fractional index to `(lon, lat)`.
    ///
    /// `x` is clamped to `[0, nx-1]` and `y` to `[0, ny-1]` before
    /// interpolating, so this never fails. NaN indices are treated as 0.
    pub fn to_lonlat(&self, x: f64, y: f64) -> (f64, f64) {
        let x = clamp_index(x, self.nx);
        let y = clamp_index(y, self.ny);
        (
            bilinear_interpolate(&self.lon, self.nx, self.ny, x, y),
            bilinear_interpolate(&self.lat, self.nx, self.ny, x, y),
        )
    }

    /// Nearest node to `(lon, lat)` by Euclidean distance in degrees.
    ///
    /// Scans every node, `j` outer and `i` inner; ties keep the first node
    /// encountered. O(nx * ny) per call.
    pub fn to_index(&self, lon: f64, lat: f64) -> (usize, usize) {
        let mut best = (0, 0);
        let mut min_dist = f64::INFINITY;
        for j in 0..self.ny {
            for i in 0..self.nx {
                let idx = j * self.nx + i;
                let dlon = lon - self.lon[idx];
                let dlat = lat - self.lat[idx];
                let dist = (dlon * dlon + dlat * dlat).sqrt();
                if dist < min_dist {
                    min_dist = dist;
                    best = (i, j);
                }
            }
        }
        best
    }
}

fn clamp_index(value: f64, len: usize) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, (len - 1) as f64)
}
