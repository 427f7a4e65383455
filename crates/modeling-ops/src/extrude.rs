use part_geom::Vec3;
use shape_kernel::SolidHandle;
use tracing::info;

use crate::kernel_ext::KernelBundle;
use crate::profile::{build_face, Profile2d, SketchPlane};
use crate::types::OpError;

/// Extrude a closed profile, minus `holes`, along `vector`.
pub fn execute_extrude(
    kb: &mut dyn KernelBundle,
    outer: &Profile2d,
    holes: &[Profile2d],
    plane: &SketchPlane,
    vector: Vec3,
) -> Result<SolidHandle, OpError> {
    if !vector.is_finite() || vector.length() <= part_geom::LENGTH_EPSILON {
        return Err(OpError::InvalidParameter {
            reason: "extrusion vector must be non-zero".to_string(),
        });
    }
    let face = build_face(kb, outer, holes, plane)?;
    let solid = kb.extrude(face, vector)?;
    info!(
        holes = holes.len(),
        distance = vector.length(),
        faces = kb.list_faces(&solid).len(),
        "extruded profile"
    );
    Ok(solid)
}
