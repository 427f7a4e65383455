//! Triangle-buffer extraction from kernel solids.
//!
//! The kernel triangulates every face in its own local frame; extraction maps
//! each node through the face location and emits flat-shaded triangles.

pub mod buffer;
pub mod extract;

pub use buffer::TriangleBuffer;
pub use extract::{extract, MeshError, DEFAULT_TOLERANCE};
