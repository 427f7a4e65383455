//! Interactive part session: selection edits, rebuilds and the displayed mesh.
//!
//! The displayed mesh only ever changes to the result of a successful
//! rebuild, to the empty mesh of the unconfigured state, or back to the mesh
//! saved when an edit began.

use std::marker::PhantomData;
use std::sync::Arc;

use mesh_extract::TriangleBuffer;
use modeling_ops::KernelBundle;
use part_catalog::{Notice, ResolvedDimensions, SelectionEdit, SelectionState, Variant};
use shape_kernel::TruckKernel;
use sketch_contours::{ContourLoop, SketchDrawing};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::families::PartFamily;
use crate::pipeline::{run_pipeline_on, PipelineOutput};

#[derive(Debug, Clone)]
struct Displayed {
    mesh: TriangleBuffer,
    dimensions: Option<ResolvedDimensions>,
}

#[derive(Debug)]
struct OpenEdit {
    edit: SelectionEdit,
    saved: Displayed,
}

#[derive(Debug)]
pub struct PartSession<K = TruckKernel> {
    id: Uuid,
    family: Arc<dyn PartFamily>,
    config: PipelineConfig,
    selection: SelectionState,
    shown: Displayed,
    edit: Option<OpenEdit>,
    notices: Vec<Notice>,
    _kernel: PhantomData<fn() -> K>,
}

impl<K: KernelBundle + Default> PartSession<K> {
    /// A new session in the unconfigured state, showing nothing.
    pub fn new(family: Arc<dyn PartFamily>, config: PipelineConfig) -> Self {
        let id = Uuid::new_v4();
        info!(%id, family = family.name(), "part session opened");
        Self {
            id,
            family,
            config,
            selection: SelectionState::unconfigured(),
            shown: Displayed {
                mesh: TriangleBuffer::new(),
                dimensions: None,
            },
            edit: None,
            notices: Vec::new(),
            _kernel: PhantomData,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn family(&self) -> &dyn PartFamily {
        self.family.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The committed selection.
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn mesh(&self) -> &TriangleBuffer {
        &self.shown.mesh
    }

    pub fn dimensions(&self) -> Option<&ResolvedDimensions> {
        self.shown.dimensions.as_ref()
    }

    /// Notices from the last rebuild attempt.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Start an edit of the selection. With `preview`, every change is
    /// rebuilt and shown at once; otherwise only [`Self::commit`] rebuilds.
    /// An edit already in progress keeps its snapshot and takes the new mode.
    pub fn begin_edit(&mut self, preview: bool) {
        match &mut self.edit {
            Some(open) => open.edit.set_preview(preview),
            None => {
                self.edit = Some(OpenEdit {
                    edit: SelectionEdit::begin(self.selection, preview),
                    saved: self.shown.clone(),
                });
            }
        }
    }

    pub fn set_row(&mut self, row: usize) -> Result<(), PipelineError> {
        let open = self.edit.as_mut().ok_or(PipelineError::NoEdit)?;
        open.edit.set_row(row);
        self.preview()
    }

    pub fn set_variant(&mut self, variant: Variant) -> Result<(), PipelineError> {
        let open = self.edit.as_mut().ok_or(PipelineError::NoEdit)?;
        open.edit.set_variant(variant);
        self.preview()
    }

    fn preview(&mut self) -> Result<(), PipelineError> {
        let Some(open) = &self.edit else {
            return Err(PipelineError::NoEdit);
        };
        if !open.edit.is_preview() {
            return Ok(());
        }
        let working = open.edit.working();
        let result = self.evaluate(&working);
        self.show(result)
    }

    /// Keep the edited selection and rebuild it. On failure the edit is
    /// abandoned: the previous selection and mesh stay in place.
    pub fn commit(&mut self) -> Result<(), PipelineError> {
        let open = self.edit.take().ok_or(PipelineError::NoEdit)?;
        let working = open.edit.working();
        match self.evaluate(&working) {
            Ok(output) => {
                self.selection = working;
                debug!(row = ?working.row, variant = working.variant.number(), "selection committed");
                self.show(Ok(output))
            }
            Err(e) => {
                self.selection = open.edit.rollback();
                self.shown = open.saved;
                self.show(Err(e))
            }
        }
    }

    /// Abandon the edit and restore the selection and mesh from before it.
    pub fn rollback(&mut self) -> Result<(), PipelineError> {
        let open = self.edit.take().ok_or(PipelineError::NoEdit)?;
        self.selection = open.edit.rollback();
        self.shown = open.saved;
        self.notices = vec![Notice::status("selection edit rolled back")];
        debug!("selection rolled back");
        Ok(())
    }

    /// Change row and variant in one committed edit.
    pub fn select(&mut self, selection: SelectionState) -> Result<(), PipelineError> {
        self.begin_edit(false);
        if let Some(open) = &mut self.edit {
            match selection.row {
                Some(row) => open.edit.set_row(row),
                None => open.edit.clear_row(),
            }
            open.edit.set_variant(selection.variant);
        }
        self.commit()
    }

    /// Rebuild the committed selection.
    pub fn rebuild(&mut self) -> Result<(), PipelineError> {
        let result = self.evaluate(&self.selection);
        self.show(result)
    }

    /// Section sketch of the committed part.
    pub fn sketch(&self) -> Result<SketchDrawing, PipelineError> {
        let resolution = self.family.resolve(&self.selection)?;
        Ok(self.family.sketch(&resolution.dimensions)?)
    }

    /// Closed loops of the section sketch.
    pub fn contours(&self) -> Result<Vec<ContourLoop>, PipelineError> {
        Ok(self.sketch()?.closed_contours(self.config.contour_tolerance)?)
    }

    fn evaluate(&self, selection: &SelectionState) -> Result<Option<PipelineOutput>, PipelineError> {
        if !selection.is_configured() {
            return Ok(None);
        }
        run_pipeline_on::<K>(self.family.as_ref(), selection, &self.config).map(Some)
    }

    fn show(&mut self, result: Result<Option<PipelineOutput>, PipelineError>) -> Result<(), PipelineError> {
        match result {
            Ok(Some(output)) => {
                self.shown = Displayed {
                    mesh: output.mesh,
                    dimensions: Some(output.dimensions),
                };
                self.notices = output.notices;
                Ok(())
            }
            Ok(None) => {
                self.shown = Displayed {
                    mesh: TriangleBuffer::new(),
                    dimensions: None,
                };
                self.notices = vec![Notice::status("no catalog row selected")];
                Ok(())
            }
            Err(e) => {
                error!(session = %self.id, error = %e, "rebuild failed, keeping previous mesh");
                self.notices = vec![Notice::error(e.to_string())];
                Err(e)
            }
        }
    }
}
