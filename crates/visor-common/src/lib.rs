//! Common types and utilities shared across the dispersion visor crates.

pub mod attributes;
pub mod error;
pub mod key;
pub mod time;

pub use attributes::GridAttributes;
pub use error::{
    Alert, DecodeError, FetchError, FieldError, KeyError, ProjectionError, ScenarioError,
};
pub use key::CacheKey;
pub use time::{frame_time, instance_for_date, parse_instance, series_window};
