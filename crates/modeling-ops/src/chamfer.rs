use shape_kernel::{EdgeId, SolidHandle};
use tracing::{info, warn};

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Chamfer the given edges of a solid.
///
/// An empty edge set is not an error: the solid comes back untouched and
/// the kernel is not called.
pub fn execute_chamfer(
    kb: &mut dyn KernelBundle,
    solid: SolidHandle,
    edges: &[EdgeId],
    distance: f64,
) -> Result<SolidHandle, OpError> {
    if !(distance.is_finite() && distance > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: "chamfer distance must be positive".to_string(),
        });
    }
    if edges.is_empty() {
        warn!("chamfer: no edges selected");
        return Ok(solid);
    }
    let handle = kb.chamfer_edges(solid, edges, distance)?;
    info!(distance, edges = edges.len(), "chamfered");
    Ok(handle)
}
