use part_geom::{Point3d, Vec3};
use shape_kernel::{Kernel, KernelError, KernelIntrospect, SolidHandle};
use tracing::{debug, info, instrument};

use crate::buffer::TriangleBuffer;

/// Triangulation tolerance used when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, thiserror::Error)]
pub enum MeshError {
    #[error("invalid tolerance {tolerance}")]
    InvalidTolerance { tolerance: f64 },

    #[error("triangulation failed: {0}")]
    Kernel(#[from] KernelError),

    #[error("face {face} references node {index} of {nodes}")]
    NodeOutOfRange {
        face: u64,
        index: usize,
        nodes: usize,
    },
}

fn flat_normal(p1: Point3d, p2: Point3d, p3: Point3d) -> Vec3 {
    (p2 - p1).cross(&(p3 - p1)).normalized().unwrap_or(Vec3::ZERO)
}

/// Triangulate `solid` and gather every face's triangles into one buffer.
///
/// Faces without a triangulation are skipped; a solid with none yields an
/// empty buffer. Each triangle gets the normalized `(p2 - p1) x (p3 - p1)`
/// at all three corners, or a zero normal when it has no area.
#[instrument(skip(kernel, solid))]
pub fn extract<K>(kernel: &mut K, solid: &SolidHandle, tolerance: f64) -> Result<TriangleBuffer, MeshError>
where
    K: Kernel + KernelIntrospect + ?Sized,
{
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return Err(MeshError::InvalidTolerance { tolerance });
    }
    kernel.triangulate(solid, tolerance)?;

    let mut buffer = TriangleBuffer::new();
    let mut skipped = 0usize;
    for face in kernel.list_faces(solid) {
        let Some(mesh) = kernel.face_triangulation(face) else {
            skipped += 1;
            continue;
        };
        let nodes: Vec<_> = mesh
            .nodes
            .iter()
            .map(|p| mesh.location.transform_point(p))
            .collect();
        let lookup = |index: usize| {
            nodes.get(index).copied().ok_or(MeshError::NodeOutOfRange {
                face: face.0,
                index,
                nodes: nodes.len(),
            })
        };
        for tri in &mesh.triangles {
            let [p1, p2, p3] = [lookup(tri[0])?, lookup(tri[1])?, lookup(tri[2])?];
            let normal = flat_normal(p1, p2, p3);
            buffer.push_flat(
                [p1.to_f32_array(), p2.to_f32_array(), p3.to_f32_array()],
                normal.to_f32_array(),
            );
        }
        debug!(face = face.0, triangles = mesh.triangles.len(), "face extracted");
    }
    info!(triangles = buffer.triangle_count(), skipped, "mesh extracted");
    Ok(buffer)
}
