pub mod boolean;
pub mod chamfer;
pub mod extrude;
pub mod fillet;
pub mod kernel_ext;
pub mod pattern;
pub mod profile;
pub mod revolve;
pub mod select;
pub mod types;

pub use boolean::{execute_boolean, BooleanKind};
pub use chamfer::execute_chamfer;
pub use extrude::execute_extrude;
pub use fillet::execute_fillet;
pub use kernel_ext::KernelBundle;
pub use pattern::{execute_radial_pattern, pattern_transforms};
pub use profile::{build_face, build_wire, ArcDirection, Profile2d, ProfileSegment, SketchPlane};
pub use revolve::execute_revolve;
pub use select::{select_edges, EdgeSelector, Side};
pub use types::*;
