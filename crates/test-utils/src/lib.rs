//! Test support for the dispersion visor crates.
//!
//! - [`generators`] encodes grid buffers the way the backend serves them
//! - [`fixtures`] holds the sample context, sources and coordinate fields
//! - [`MockApi`] answers the backend endpoints from memory and counts requests
//!
//! Most tests start from [`sample_api`], which serves one domain with a
//! 3x2 grid, two time steps and two projects.

pub mod fixtures;
pub mod generators;
pub mod mock_api;

pub use fixtures::*;
pub use generators::*;
pub use mock_api::{Endpoint, MockApi};

/// Fails when two scalars differ by more than `tol`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (actual, expected, tol) = ($actual as f64, $expected as f64, $tol as f64);
        if !((actual - expected).abs() <= tol) {
            panic!(
                "values differ: actual {} expected {} (tolerance {})",
                actual, expected, tol
            );
        }
    }};
}

/// Element-wise [`assert_approx_eq!`] over two slices of equal length.
#[macro_export]
macro_rules! assert_values_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let actual: &[f64] = &$actual;
        let expected: &[f64] = &$expected;
        assert_eq!(actual.len(), expected.len(), "length mismatch");
        for (cell, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            if !((a - e).abs() <= $tol) {
                panic!("cell {}: actual {} expected {}", cell, a, e);
            }
        }
    }};
}
