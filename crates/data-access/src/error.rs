//! Failures assembling one cache entry.

use thiserror::Error;
use visor_common::{Alert, DecodeError, FetchError, ProjectionError};

/// Why a load produced no data. Every variant is cached as a negative
/// entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("coordinate field failed: {0}")]
    Projection(#[from] ProjectionError),

    #[error("variable {0} names no coordinate variables")]
    MissingCoordinates(String),
}

impl LoadError {
    /// Notification shown for this failure.
    pub fn alert(&self, context: &str) -> Alert {
        match self {
            LoadError::Fetch(err) => Alert::from_fetch_error(err, context),
            _ => Alert::for_status(500, context),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_status() {
        let not_found = LoadError::from(FetchError::status(404, "data"));
        assert_eq!(not_found.alert("pm25").status, 404);
        let decode = LoadError::from(DecodeError::shape_mismatch(4, 3));
        assert_eq!(decode.alert("pm25").status, 500);
    }
}
