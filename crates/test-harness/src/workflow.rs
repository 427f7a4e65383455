//! PartScenario: fluent runner for scripting a selection through the pipeline.
//!
//! Runs on a [`RecordingKernel`] over the reference backend, so a scenario
//! can assert on the kernel calls a recipe made as well as on its mesh.

use std::sync::Arc;

use part_catalog::{SelectionState, Variant};
use part_engine::{run_pipeline_with, PartFamily, PipelineConfig, PipelineError, PipelineOutput};
use part_geom::BoundingBox;
use shape_kernel::{KernelCall, RecordingKernel, ReferenceKernel};
use tracing::debug;

use crate::helpers::HarnessError;
use crate::oracle::{self, OracleVerdict};
use crate::report::PartReport;

/// A family plus the selection and configuration to run it with.
#[derive(Debug, Clone)]
pub struct PartScenario {
    family: Arc<dyn PartFamily>,
    selection: SelectionState,
    config: PipelineConfig,
    oracles: bool,
}

impl PartScenario {
    pub fn new(family: Arc<dyn PartFamily>) -> Self {
        Self {
            family,
            selection: SelectionState::unconfigured(),
            config: PipelineConfig::coarse(),
            oracles: true,
        }
    }

    pub fn row(mut self, row: usize) -> Self {
        self.selection.row = Some(row);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.selection.variant = variant;
        self
    }

    pub fn selection(mut self, selection: SelectionState) -> Self {
        self.selection = selection;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Skip the standard mesh oracles.
    pub fn without_oracles(mut self) -> Self {
        self.oracles = false;
        self
    }

    /// Run the pipeline. Pipeline failures are captured in the outcome, not
    /// returned, so failing selections can be asserted on too.
    pub fn run(&self) -> ScenarioOutcome {
        let mut kernel = RecordingKernel::new(ReferenceKernel::new());
        let result = run_pipeline_with(&mut kernel, self.family.as_ref(), &self.selection, &self.config);
        let verdicts = match (&result, self.oracles) {
            (Ok(output), true) => oracle::run_mesh_oracles(&output.mesh),
            _ => Vec::new(),
        };
        debug!(
            family = self.family.name(),
            ok = result.is_ok(),
            calls = kernel.calls().len(),
            "scenario finished"
        );
        ScenarioOutcome {
            family: self.family.name().to_string(),
            selection: self.selection,
            result,
            kernel_calls: kernel.calls().to_vec(),
            verdicts,
        }
    }
}

/// What one scenario run produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub family: String,
    pub selection: SelectionState,
    pub result: Result<PipelineOutput, PipelineError>,
    pub kernel_calls: Vec<KernelCall>,
    pub verdicts: Vec<OracleVerdict>,
}

impl ScenarioOutcome {
    fn context(&self) -> String {
        format!(
            "{} row {:?} variant {}",
            self.family,
            self.selection.row,
            self.selection.variant.number()
        )
    }

    pub fn output(&self) -> Result<&PipelineOutput, HarnessError> {
        self.result.as_ref().map_err(|e| HarnessError::AssertionFailed {
            detail: format!("[{}] pipeline failed: {e}", self.context()),
        })
    }

    pub fn count_calls(&self, pred: impl Fn(&KernelCall) -> bool) -> usize {
        self.kernel_calls.iter().filter(|c| pred(c)).count()
    }

    pub fn union_count(&self) -> usize {
        self.count_calls(|c| matches!(c, KernelCall::Union))
    }

    /// Run an extra oracle against the mesh and keep its verdict.
    pub fn check(&mut self, verdict: impl FnOnce(&PipelineOutput) -> OracleVerdict) -> &mut Self {
        if let Ok(output) = &self.result {
            self.verdicts.push(verdict(output));
        }
        self
    }

    pub fn check_bounding_box(&mut self, expected: BoundingBox, tol: f64) -> &mut Self {
        self.check(|o| oracle::check_bounding_box(&o.mesh, &expected, tol))
    }

    /// Fail on a pipeline error or the first failed verdict.
    pub fn assert_ok(&self) -> Result<&PipelineOutput, HarnessError> {
        let output = self.output()?;
        if let Some(v) = self.verdicts.iter().find(|v| !v.passed) {
            return Err(HarnessError::OracleFailure {
                oracle: v.oracle_name.clone(),
                detail: format!("[{}] {}", self.context(), v.detail),
            });
        }
        Ok(output)
    }

    /// Fail unless the pipeline failed with an error matching `pred`.
    pub fn assert_failed(&self, pred: impl Fn(&PipelineError) -> bool) -> Result<(), HarnessError> {
        match &self.result {
            Err(e) if pred(e) => Ok(()),
            Err(e) => Err(HarnessError::AssertionFailed {
                detail: format!("[{}] failed with unexpected error: {e}", self.context()),
            }),
            Ok(_) => Err(HarnessError::AssertionFailed {
                detail: format!("[{}] expected a failure, pipeline succeeded", self.context()),
            }),
        }
    }

    pub fn report(&self) -> PartReport {
        PartReport::from_outcome(self)
    }
}
