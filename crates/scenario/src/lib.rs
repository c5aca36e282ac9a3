//! Emission-source scenarios.
//!
//! Species variables carry one raw plane per emission source along their
//! source axis. The sources endpoint lists those sources, each with zero
//! or more emission categories. Expansion gives every (source, category)
//! pair its own row on a virtual source axis; rows of one source read the
//! same raw plane and differ only in their scenario multipliers.
//!
//! ```text
//! raw axis        expanded axis
//!   s0  ───────►  0 crushing
//!       ───────►  1 transport
//!   s1  ───────►  2 unknown
//!   s2  ───────►  3 pit
//! ```

pub mod expander;
pub mod layer;
pub mod sources;
pub mod vectors;

pub use expander::{expand, ExpandedSource, UNKNOWN_CATEGORY};
pub use layer::{AxisLabel, SourceLayer};
pub use sources::{
    display_label, is_species_variable, listed_categories, species_tag, GeometryKind,
    SourceFeature,
};
pub use vectors::{ScenarioRow, ScenarioVectors, MAX_EMISSION};
