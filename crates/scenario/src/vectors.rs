//! User-editable abatement and emission multipliers.

use serde::{Deserialize, Serialize};
use tracing::debug;
use visor_common::ScenarioError;

/// Largest emission rate the table accepts.
pub const MAX_EMISSION: f64 = 10_000.0;

/// Per-source scenario inputs, indexed by the source axis.
///
/// The combiner weights source `v` by
/// `emission_rate[v] * (1 - abatement_pct[v] / 100)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioVectors {
    pub abatement_pct: Vec<f64>,
    pub emission_rate: Vec<f64>,
}

/// One edited table row, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub index: usize,
    pub abatement: String,
    pub emission: String,
}

impl ScenarioRow {
    pub fn new(index: usize, abatement: impl Into<String>, emission: impl Into<String>) -> Self {
        Self {
            index,
            abatement: abatement.into(),
            emission: emission.into(),
        }
    }
}

impl ScenarioVectors {
    /// Defaults for an axis of `len` sources: no abatement anywhere,
    /// `first_emission` at index 0 and zero emission elsewhere.
    pub fn with_defaults(len: usize, first_emission: f64) -> Self {
        let mut emission_rate = vec![0.0; len];
        if let Some(first) = emission_rate.first_mut() {
            *first = first_emission;
        }
        Self {
            abatement_pct: vec![0.0; len],
            emission_rate,
        }
    }

    /// Uniform emission with no abatement.
    pub fn uniform(len: usize, emission: f64) -> Self {
        Self {
            abatement_pct: vec![0.0; len],
            emission_rate: vec![emission; len],
        }
    }

    pub fn len(&self) -> usize {
        self.emission_rate.len().min(self.abatement_pct.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weight applied to source `v`.
    pub fn multiplier(&self, v: usize) -> Option<f64> {
        let emission = self.emission_rate.get(v)?;
        let abatement = self.abatement_pct.get(v)?;
        Some(emission * (1.0 - abatement / 100.0))
    }

    pub fn set_abatement(&mut self, index: usize, pct: f64) -> Result<(), ScenarioError> {
        check_abatement(pct)?;
        let len = self.abatement_pct.len();
        let slot = self
            .abatement_pct
            .get_mut(index)
            .ok_or(ScenarioError::IndexOutOfRange { index, len })?;
        *slot = pct;
        Ok(())
    }

    pub fn set_emission(&mut self, index: usize, rate: f64) -> Result<(), ScenarioError> {
        check_emission(rate)?;
        let len = self.emission_rate.len();
        let slot = self
            .emission_rate
            .get_mut(index)
            .ok_or(ScenarioError::IndexOutOfRange { index, len })?;
        *slot = rate;
        Ok(())
    }

    /// Apply edited table rows.
    ///
    /// Text that does not parse as a number counts as 0. Every row is
    /// validated before any is written, so a rejected edit leaves the
    /// vectors untouched.
    pub fn apply_rows(&mut self, rows: &[ScenarioRow]) -> Result<(), ScenarioError> {
        let len = self.len();
        let parsed = rows
            .iter()
            .map(|row| {
                if row.index >= len {
                    return Err(ScenarioError::IndexOutOfRange {
                        index: row.index,
                        len,
                    });
                }
                let abatement = parse_or_zero(&row.abatement);
                let emission = parse_or_zero(&row.emission);
                check_abatement(abatement)?;
                check_emission(emission)?;
                Ok((row.index, abatement, emission))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (index, abatement, emission) in parsed {
            self.abatement_pct[index] = abatement;
            self.emission_rate[index] = emission;
        }
        debug!(rows = rows.len(), "Applied scenario rows");
        Ok(())
    }
}

fn parse_or_zero(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

fn check_abatement(pct: f64) -> Result<(), ScenarioError> {
    if pct.is_finite() && (0.0..=100.0).contains(&pct) {
        Ok(())
    } else {
        Err(ScenarioError::AbatementOutOfRange(pct))
    }
}

fn check_emission(rate: f64) -> Result<(), ScenarioError> {
    if rate.is_finite() && (0.0..=MAX_EMISSION).contains(&rate) {
        Ok(())
    } else {
        Err(ScenarioError::EmissionOutOfRange {
            value: rate,
            max: MAX_EMISSION,
        })
    }
}
