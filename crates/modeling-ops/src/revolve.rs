use part_geom::{Point3d, Vec3};
use shape_kernel::SolidHandle;
use tracing::info;

use crate::kernel_ext::KernelBundle;
use crate::profile::{build_face, Profile2d, SketchPlane};
use crate::types::OpError;

/// Revolve a closed profile a full turn about the axis line.
pub fn execute_revolve(
    kb: &mut dyn KernelBundle,
    profile: &Profile2d,
    plane: &SketchPlane,
    axis_origin: Point3d,
    axis_direction: Vec3,
) -> Result<SolidHandle, OpError> {
    let face = build_face(kb, profile, &[], plane)?;
    let solid = kb.revolve(face, axis_origin, axis_direction)?;
    info!(
        segments = profile.segments.len(),
        faces = kb.list_faces(&solid).len(),
        "revolved profile"
    );
    Ok(solid)
}
