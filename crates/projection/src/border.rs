//! Domain outline and geographic extent.

use serde::{Deserialize, Serialize};

use crate::coordinate::CoordinateField;

/// A geographic extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// Outline of the grid as a ring of node coordinates.
///
/// Walks only the four edges of the index grid: the `j = 0` row with `i`
/// ascending, the `i = nx-1` column with `j` ascending, the `j = ny-1` row
/// with `i` descending, then the `i = 0` column with `j` descending. The
/// ring follows the index grid's boundary, so it stays a proper outer
/// boundary however the grid is oriented geographically. Corner nodes
/// appear twice, once at the end of each edge they join.
pub fn domain_border(field: &CoordinateField) -> Vec<(f64, f64)> {
    let (nx, ny) = (field.nx(), field.ny());
    let lon = field.lon_values();
    let lat = field.lat_values();
    let at = |i: usize, j: usize| (lon[j * nx + i], lat[j * nx + i]);

    let mut ring = Vec::with_capacity(2 * (nx + ny));
    ring.extend((0..nx).map(|i| at(i, 0)));
    ring.extend((0..ny).map(|j| at(nx - 1, j)));
    ring.extend((0..nx).rev().map(|i| at(i, ny - 1)));
    ring.extend((0..ny).rev().map(|j| at(0, j)));
    ring
}

/// Bounding extent of a ring, `None` for an empty ring.
pub fn border_extent(ring: &[(f64, f64)]) -> Option<Extent> {
    let (first_lon, first_lat) = *ring.first()?;
    let init = Extent::new(first_lon, first_lat, first_lon, first_lat);
    Some(ring.iter().fold(init, |acc, &(lon, lat)| {
        Extent::new(
            acc.min_lon.min(lon),
            acc.min_lat.min(lat),
            acc.max_lon.max(lon),
            acc.max_lat.max(lat),
        )
    }))
}
