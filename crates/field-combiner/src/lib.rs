//! Field evaluation for display.
//!
//! [`combine`] reduces the source axis of a payload to one `(y, x)` field
//! at a frame and level, weighting each source by its scenario
//! multiplier. [`combine_point`] does the same at a single cell for every
//! frame, keeping one bucket per project. [`wind_glyphs`] turns u/v
//! component planes into per-node glyph rotations and sizes.

pub mod combiner;
pub mod wind;

pub use combiner::{
    combine, combine_point, FieldSummary, PointSeries, ProjectSeries, TOTAL_BUCKET,
};
pub use wind::{expected_max_speed, wind_glyphs, WindGlyph, DEFAULT_MAX_SPEED};
