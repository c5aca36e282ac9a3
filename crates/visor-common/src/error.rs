//! Error types for the dispersion visor core.
//!
//! Decoder and projector errors signal a backend data-contract violation and
//! are never recovered locally. Fetch errors are recovered by the data access
//! layer, which turns them into negative cache entries and [`Alert`]s.

use thiserror::Error;

/// Failures while turning a raw byte buffer into a grid payload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Byte lengths: what the header's shape and encoding require, and
    /// what the body holds.
    #[error("shape mismatch: header requires {expected} bytes, buffer holds {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid grid header: {0}")]
    InvalidHeader(String),

    #[error("index ({t}, {v}, {z}) outside shape ({nt}, {nv}, {nz})")]
    IndexOutOfRange {
        t: usize,
        v: usize,
        z: usize,
        nt: usize,
        nv: usize,
        nz: usize,
    },
}

impl DecodeError {
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Failures while building a coordinate field.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("coordinate shape mismatch: lon is {lon_nx}x{lon_ny}, lat is {lat_nx}x{lat_ny}")]
    ShapeMismatch {
        lon_nx: usize,
        lon_ny: usize,
        lat_nx: usize,
        lat_ny: usize,
    },

    #[error("coordinate grid has no cells")]
    EmptyGrid,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failures talking to the `/api/*` backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP {status} ({context})")]
    HttpStatus { status: u16, context: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

impl FetchError {
    pub fn status(status: u16, context: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            context: context.into(),
        }
    }

    /// HTTP status this failure should be reported under.
    ///
    /// Network and body failures are reported like a server failure.
    pub fn http_status(&self) -> u16 {
        match self {
            FetchError::HttpStatus { status, .. } => *status,
            FetchError::Network(_) | FetchError::InvalidBody(_) => 500,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidBody(err.to_string())
    }
}

/// Argument failures of the field combiner.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    #[error("{what} index {index} outside [0, {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("scenario vectors cover {actual} sources, source axis has {expected}")]
    ScenarioLength { expected: usize, actual: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Rejected cache key components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("cache key component '{0}' is empty")]
    EmptyComponent(&'static str),

    #[error("cache key component '{component}' contains the delimiter: {value}")]
    DelimiterInComponent {
        component: &'static str,
        value: String,
    },
}

/// Rejected scenario table edits.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("abatement {0} outside [0, 100]")]
    AbatementOutOfRange(f64),

    #[error("emission {value} outside [0, {max}]")]
    EmissionOutOfRange { value: f64, max: f64 },

    #[error("source index {index} outside [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A single dismissible user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub status: u16,
    pub message: String,
}

impl Alert {
    /// Build the notification for an HTTP status, suffixed with the fetch
    /// context when one is known.
    pub fn for_status(status: u16, context: &str) -> Self {
        let base = match status {
            400 => "The request was invalid.",
            401 => "Authentication failed.",
            403 => "You do not have permission to access this resource.",
            404 => "The requested resource was not found.",
            _ => "Loading data failed. The server may be unavailable.",
        };
        let message = if context.is_empty() {
            base.to_string()
        } else {
            format!("{} ({})", base, context)
        };
        Self { status, message }
    }

    pub fn from_fetch_error(err: &FetchError, context: &str) -> Self {
        Self::for_status(err.http_status(), context)
    }
}
