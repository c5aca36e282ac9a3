//! Headless driver of the dispersion visor core.
//!
//! Builds a [`data_access::DataCache`] over the HTTP backend, starts a
//! [`visor_state::VisorSession`] and prints what a viewer would display.

pub mod probe;
pub mod report;

pub use probe::{
    browse_report, field_report, outline_report, select, series_report, wind_report, Target,
};
