use shape_kernel::SolidHandle;
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BooleanKind {
    Union,
    Subtract,
    Intersect,
}

/// Execute a boolean operation between two solids. Both inputs are consumed.
pub fn execute_boolean(
    kb: &mut dyn KernelBundle,
    body_a: SolidHandle,
    body_b: SolidHandle,
    kind: BooleanKind,
) -> Result<SolidHandle, OpError> {
    let handle = match kind {
        BooleanKind::Union => kb.boolean_union(body_a, body_b)?,
        BooleanKind::Subtract => kb.boolean_difference(body_a, body_b)?,
        BooleanKind::Intersect => kb.boolean_intersection(body_a, body_b)?,
    };
    debug!(?kind, faces = kb.list_faces(&handle).len(), "boolean");
    Ok(handle)
}
