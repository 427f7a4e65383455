//! part-engine: turns a catalog selection into a solid and a triangle buffer.
//!
//! Flow: selection -> [`part_catalog::resolve`] -> [`PartFamily::recipe`] ->
//! [`sequencer::build`] -> [`mesh_extract::extract`].

pub mod config;
pub mod error;
pub mod families;
pub mod pipeline;
pub mod recipe;
pub mod sequencer;
pub mod session;
pub mod worker;

pub use config::{PipelineConfig, SelectionTolerances};
pub use error::PipelineError;
pub use families::{
    builtin_families, Bushing, CouplingHalf, CouplingPair, JawCouplingHalf, PartFamily, Sprocket,
};
pub use pipeline::{run_pipeline, run_pipeline_on, run_pipeline_with, PipelineOutput};
pub use recipe::{AxisLine, PatternFeature, Recipe, RecipeStep};
pub use sequencer::{build, BuildError, BuildOutput};
pub use session::PartSession;
pub use worker::{BuildCompletion, BuildWorker};
