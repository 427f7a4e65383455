//! Error type and small utilities shared by the harness.

use file_format::StlError;
use part_catalog::{SelectionState, Variant};
use part_engine::{PartFamily, PipelineError};

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("stl: {0}")]
    Stl(#[from] StlError),
}

/// Every row and variant of the family's catalog, row-major.
pub fn every_selection(family: &dyn PartFamily) -> Vec<SelectionState> {
    (0..family.catalog().row_count())
        .flat_map(|row| {
            [Variant::First, Variant::Second]
                .into_iter()
                .map(move |v| SelectionState::configured(row, v))
        })
        .collect()
}

pub(crate) fn sub(a: [f32; 3], b: [f32; 3]) -> [f64; 3] {
    [
        f64::from(a[0]) - f64::from(b[0]),
        f64::from(a[1]) - f64::from(b[1]),
        f64::from(a[2]) - f64::from(b[2]),
    ]
}

pub(crate) fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub(crate) fn length(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
