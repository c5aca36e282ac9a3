//! The `X-Header` JSON side channel of `/api/data`.

use serde::{Deserialize, Serialize};
use visor_common::{DecodeError, GridAttributes};

fn one() -> usize {
    1
}

/// Shape, attributes and element encoding of one data response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    #[serde(default)]
    pub variable: String,

    /// Time steps.
    pub nt: usize,

    /// Source-axis length; absent for non-source variables.
    #[serde(default = "one")]
    pub nv: usize,

    /// Vertical levels.
    #[serde(default = "one")]
    pub nz: usize,

    pub ny: usize,
    pub nx: usize,

    #[serde(default)]
    pub attrs: GridAttributes,

    /// Element encoding label (`uint8`, `float16`, `float32`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,
}

impl GridHeader {
    /// Parse the header string carried by the response.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Logical shape `(t, v, z, y, x)`.
    pub fn shape(&self) -> [usize; 5] {
        [self.nt, self.nv, self.nz, self.ny, self.nx]
    }

    /// Declared element count, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.shape()
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }
}
