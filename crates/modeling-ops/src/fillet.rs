use shape_kernel::{EdgeId, SolidHandle};
use tracing::{info, warn};

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Execute a fillet operation on specified edges of a solid.
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    solid: SolidHandle,
    edges: &[EdgeId],
    radius: f64,
) -> Result<SolidHandle, OpError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: "fillet radius must be positive".to_string(),
        });
    }
    if edges.is_empty() {
        warn!("fillet: no edges selected");
        return Ok(solid);
    }
    let handle = kb.fillet_edges(solid, edges, radius)?;
    info!(radius, edges = edges.len(), "filleted");
    Ok(handle)
}
