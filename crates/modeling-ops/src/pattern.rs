//! Radial replication of feature solids about an axis.

use std::f64::consts::TAU;

use part_geom::{Point3d, Transform, Vec3};
use shape_kernel::SolidHandle;
use tracing::{info, instrument};

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Rotations for `count` instances at equal steps of `2π / count`.
/// Instance 0 is the identity.
pub fn pattern_transforms(axis_origin: Point3d, axis_direction: Vec3, count: usize) -> Vec<Transform> {
    (0..count)
        .map(|i| {
            Transform::rotation_about(axis_origin, axis_direction, TAU * i as f64 / count as f64)
        })
        .collect()
}

/// Union `count` rotated instances of every feature onto `target`.
///
/// Each feature is built once by the caller. Copies 1..count are duplicated
/// from it and rotated; the original itself is instance 0. This issues
/// exactly `features.len() * count` unions.
#[instrument(skip(kb, target, features), fields(features = features.len()))]
pub fn execute_radial_pattern(
    kb: &mut dyn KernelBundle,
    target: SolidHandle,
    features: Vec<SolidHandle>,
    axis_origin: Point3d,
    axis_direction: Vec3,
    count: usize,
) -> Result<SolidHandle, OpError> {
    if count == 0 {
        return Err(OpError::InvalidParameter {
            reason: "pattern count must be at least 1".to_string(),
        });
    }
    if axis_direction.normalized().is_none() {
        return Err(OpError::InvalidParameter {
            reason: "pattern axis has zero length".to_string(),
        });
    }
    let rotations = pattern_transforms(axis_origin, axis_direction, count);
    let mut current = target;
    for feature in features {
        for rotation in &rotations[1..] {
            let copy = kb.duplicate(&feature)?;
            let copy = kb.transformed(copy, rotation)?;
            current = kb.boolean_union(current, copy)?;
        }
        current = kb.boolean_union(current, feature)?;
    }
    info!(count, faces = kb.list_faces(&current).len(), "radial pattern applied");
    Ok(current)
}
