//! sketch-contours: closed-loop detection over 2D line segments, plus the
//! sketch drawing model that feeds it.

pub mod assemble;
pub mod drawing;
pub mod segment;

pub use assemble::{assemble, find_closed_loops, ContourAssembly, ContourError};
pub use drawing::{DimensionLine, SketchDrawing};
pub use segment::{ContourLoop, Segment2d};
