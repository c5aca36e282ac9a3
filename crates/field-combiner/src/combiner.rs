//! Scenario-weighted sums over the source axis.

use grid_decoder::GridPayload;
use scenario::{ScenarioVectors, SourceLayer};
use serde::{Deserialize, Serialize};
use tracing::debug;
use visor_common::FieldError;

/// Name of the bucket summing every project.
pub const TOTAL_BUCKET: &str = "total";

/// Time series of one project at one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSeries {
    pub project: String,
    pub values: Vec<f64>,
}

/// Per-project and total time series at one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSeries {
    pub i: usize,
    pub j: usize,
    pub level: usize,
    /// Project buckets in first-appearance order.
    pub projects: Vec<ProjectSeries>,
    pub total: Vec<f64>,
}

impl PointSeries {
    /// Series of one bucket; [`TOTAL_BUCKET`] names the total.
    pub fn get(&self, bucket: &str) -> Option<&[f64]> {
        if bucket == TOTAL_BUCKET {
            return Some(&self.total);
        }
        self.projects
            .iter()
            .find(|p| p.project == bucket)
            .map(|p| p.values.as_slice())
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}

/// Combine every source plane at `(frame, level)` into one `(y, x)` field.
///
/// ```text
/// accum[c] += plane(frame, v, level)[c] * emission[v] * (1 - abatement[v] / 100)
/// ```
///
/// Sources are summed in ascending axis order and cells in row-major
/// order. Inputs are trusted; nothing is clamped.
pub fn combine(
    payload: &GridPayload,
    layer: &SourceLayer,
    frame: usize,
    level: usize,
    scenario: &ScenarioVectors,
) -> Result<Vec<f64>, FieldError> {
    check_index("frame", frame, payload.nt)?;
    check_index("level", level, payload.nz)?;
    check_scenario(layer, scenario)?;

    let mut accum = vec![0.0; payload.plane_len()];
    for v in 0..layer.axis_len() {
        let plane = layer.remap(payload, frame, v, level)?;
        let emission = scenario.emission_rate[v];
        let keep = 1.0 - scenario.abatement_pct[v] / 100.0;

        match plane.as_f32_slice() {
            Some(values) => {
                for (cell, value) in accum.iter_mut().zip(values) {
                    *cell += *value as f64 * emission * keep;
                }
            }
            None => {
                for (cell, value) in accum.iter_mut().zip(plane.iter()) {
                    *cell += value * emission * keep;
                }
            }
        }
    }

    debug!(
        variable = %payload.variable,
        frame,
        level,
        sources = layer.axis_len(),
        "Combined field"
    );
    Ok(accum)
}

/// Time series at cell `(i, j)` over every frame, bucketed by project.
///
/// Each source contributes to its project's bucket and to the total.
/// Sources without a project go to the `""` bucket.
pub fn combine_point(
    payload: &GridPayload,
    layer: &SourceLayer,
    i: usize,
    j: usize,
    level: usize,
    scenario: &ScenarioVectors,
) -> Result<PointSeries, FieldError> {
    check_index("x", i, payload.nx)?;
    check_index("y", j, payload.ny)?;
    check_index("level", level, payload.nz)?;
    check_scenario(layer, scenario)?;

    let axis_len = layer.axis_len();
    let mut projects: Vec<ProjectSeries> = layer
        .projects()
        .into_iter()
        .map(|project| ProjectSeries {
            project,
            values: vec![0.0; payload.nt],
        })
        .collect();
    let bucket_of: Vec<usize> = (0..axis_len)
        .map(|v| {
            let name = layer.project_of(v);
            match projects.iter().position(|p| p.project == name) {
                Some(idx) => idx,
                None => {
                    projects.push(ProjectSeries {
                        project: name.to_string(),
                        values: vec![0.0; payload.nt],
                    });
                    projects.len() - 1
                }
            }
        })
        .collect();

    let cell = j * payload.nx + i;
    let mut total = vec![0.0; payload.nt];
    for t in 0..payload.nt {
        for (v, &bucket) in bucket_of.iter().enumerate() {
            let plane = layer.remap(payload, t, v, level)?;
            let sample = plane.get(cell).unwrap_or(0.0);
            let value = sample
                * scenario.emission_rate[v]
                * (1.0 - scenario.abatement_pct[v] / 100.0);
            projects[bucket].values[t] += value;
            total[t] += value;
        }
    }

    Ok(PointSeries {
        i,
        j,
        level,
        projects,
        total,
    })
}

/// Minimum, maximum and mean of the finite values of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl FieldSummary {
    pub fn of(values: &[f64]) -> Option<Self> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max, sum, count) = finite.fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize),
            |(min, max, sum, count), v| (min.min(v), max.max(v), sum + v, count + 1),
        );
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), FieldError> {
    if index < len {
        Ok(())
    } else {
        Err(FieldError::OutOfRange { what, index, len })
    }
}

fn check_scenario(layer: &SourceLayer, scenario: &ScenarioVectors) -> Result<(), FieldError> {
    let expected = layer.axis_len();
    let actual = scenario
        .emission_rate
        .len()
        .min(scenario.abatement_pct.len());
    if actual < expected {
        return Err(FieldError::ScenarioLength { expected, actual });
    }
    Ok(())
}
