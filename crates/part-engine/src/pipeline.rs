use mesh_extract::{extract, TriangleBuffer};
use modeling_ops::KernelBundle;
use part_catalog::{Notice, ResolvedDimensions, SelectionState};
use shape_kernel::TruckKernel;
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::families::PartFamily;
use crate::sequencer::build;

/// Everything a successful rebuild hands back for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub mesh: TriangleBuffer,
    pub dimensions: ResolvedDimensions,
    pub notices: Vec<Notice>,
}

/// Resolve, build and extract `selection` on a fresh [`TruckKernel`].
pub fn run_pipeline(
    family: &dyn PartFamily,
    selection: &SelectionState,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    run_pipeline_on::<TruckKernel>(family, selection, config)
}

/// Same as [`run_pipeline`] on a fresh kernel of type `K`.
pub fn run_pipeline_on<K>(
    family: &dyn PartFamily,
    selection: &SelectionState,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError>
where
    K: KernelBundle + Default,
{
    let mut kernel = K::default();
    run_pipeline_with(&mut kernel, family, selection, config)
}

/// Same as [`run_pipeline`] against a caller-supplied kernel.
#[instrument(skip_all, fields(family = family.name(), row = ?selection.row))]
pub fn run_pipeline_with(
    kb: &mut dyn KernelBundle,
    family: &dyn PartFamily,
    selection: &SelectionState,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let resolution = family.resolve(selection)?;
    let recipe = family.recipe(&resolution.dimensions, &config.selection)?;
    let output = build(kb, &recipe, config)?;
    let mesh = extract(kb, &output.solid, config.triangulation_tolerance)?;
    info!(triangles = mesh.triangle_count(), "pipeline complete");

    let mut notices = resolution.notices;
    notices.extend(output.notices);
    notices.push(Notice::status(format!(
        "{}: {} triangles",
        family.name(),
        mesh.triangle_count()
    )));
    Ok(PipelineOutput {
        mesh,
        dimensions: resolution.dimensions,
        notices,
    })
}
