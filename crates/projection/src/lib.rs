//! Coordinate projection for curvilinear model grids.
//!
//! Model grids carry explicit longitude and latitude per node rather than
//! an analytic projection. [`CoordinateField`] wraps those node arrays and
//! provides:
//!
//! - forward mapping from fractional grid index `(x, y)` to `(lon, lat)` by
//!   bilinear interpolation, clamping out-of-range indices to the grid
//! - inverse mapping from `(lon, lat)` to the nearest node by exhaustive
//!   search
//! - the domain outline ring and its geographic extent

pub mod border;
pub mod coordinate;
pub mod interpolation;

pub use border::{border_extent, domain_border, Extent};
pub use coordinate::CoordinateField;
pub use interpolation::bilinear_interpolate;
