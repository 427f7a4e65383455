use mesh_extract::MeshError;
use part_catalog::{CatalogError, ConfigurationError};
use sketch_contours::ContourError;

use crate::sequencer::BuildError;

/// Any failure between a selection change and a displayable mesh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("contour error: {0}")]
    Contour(#[from] ContourError),

    #[error("invalid pipeline configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("no edit in progress")]
    NoEdit,

    #[error("build worker unavailable: {reason}")]
    WorkerUnavailable { reason: String },
}
