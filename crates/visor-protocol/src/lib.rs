//! Wire contract of the visor backend.
//!
//! The backend serves five endpoints:
//!
//! - `GET /api/context` → [`ApiContext`]
//! - `GET /api/instances/?domain=D` → [`InstancesResponse`]
//! - `GET /api/variables/?domain=D&instance=I` → [`VariablesResponse`]
//! - `GET /api/data/?domain=D&instance=I&variable=V` → raw bytes plus a
//!   JSON [`GridHeader`] in the `X-Header` response header
//! - `GET /api/sources/?domain=D&instance=I&species=S` → GeoJSON
//!   [`FeatureCollection`]
//!
//! [`VisorApi`] is the seam between the core and whatever serves these.

pub mod api;
pub mod context;
pub mod geojson;
pub mod header;

pub use api::{RawGrid, VisorApi, DATA_HEADER};
pub use context::{ApiContext, InstancesResponse, PointDefault, VariablesResponse};
pub use geojson::{Feature, FeatureCollection, Geometry, SourceProperties};
pub use header::GridHeader;
