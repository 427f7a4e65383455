//! Edge blends: equal-distance chamfer and constant-radius fillet.
//!
//! A blended edge is removed and replaced by two setback edges, one on each
//! adjacent face, joined by a new band face. Adjacent faces are not trimmed.

use std::collections::HashSet;
use std::f64::consts::PI;

use part_geom::Vec3;
use tracing::debug;

use super::topology::*;
use super::ReferenceKernel;
use crate::curve::Curve;
use crate::types::{EdgeId, KernelError};

/// Smallest blend result radius accepted for circular edges.
const MIN_RADIUS: f64 = 1e-9;

fn take_edge(solid: &mut RefSolid, id: EdgeId) -> Result<RefEdge, KernelError> {
    let pos = solid
        .edges
        .iter()
        .position(|e| e.id == id)
        .ok_or(KernelError::EdgeNotFound { id })?;
    Ok(solid.edges.remove(pos))
}

fn unique(edges: &[EdgeId]) -> Vec<EdgeId> {
    let mut seen = HashSet::new();
    edges.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn shared_faces(edge: &RefEdge) -> Option<(EdgeUse, EdgeUse)> {
    match edge.uses.as_slice() {
        [a, b] => Some((a.clone(), b.clone())),
        _ => None,
    }
}

/// `curve` moved by `distance` along `inward`.
fn setback(curve: &Curve, inward: &Inward, distance: f64) -> Option<Curve> {
    match (curve, inward) {
        (Curve::Line { .. }, Inward::Fixed(w)) => Some(curve.translated(*w * distance)),
        (
            Curve::Arc {
                center,
                axis,
                ref_dir,
                radius,
                sweep,
            },
            Inward::Polar { radial, axial },
        ) => {
            let radius = radius + radial * distance;
            (radius > MIN_RADIUS).then(|| Curve::Arc {
                center: *center + *axis * (axial * distance),
                axis: *axis,
                ref_dir: *ref_dir,
                radius,
                sweep: *sweep,
            })
        }
        _ => None,
    }
}

/// Direction across a chamfer band, from the setback along `from` toward the one along `to`.
fn across(from: &Inward, to: &Inward) -> Inward {
    match (from, to) {
        (Inward::Fixed(a), Inward::Fixed(b)) => Inward::Fixed((*b - *a).normalized().unwrap_or(Vec3::ZERO)),
        (
            Inward::Polar {
                radial: r1,
                axial: a1,
            },
            Inward::Polar {
                radial: r2,
                axial: a2,
            },
        ) => {
            let (dr, da) = (r2 - r1, a2 - a1);
            let len = dr.hypot(da).max(MIN_RADIUS);
            Inward::Polar {
                radial: dr / len,
                axial: da / len,
            }
        }
        _ => *to,
    }
}

impl ReferenceKernel {
    pub(crate) fn chamfer_solid(
        &mut self,
        mut solid: RefSolid,
        edges: &[EdgeId],
        distance: f64,
    ) -> Result<RefSolid, KernelError> {
        for id in unique(edges) {
            let edge = take_edge(&mut solid, id)?;
            let (first, second) = shared_faces(&edge).ok_or_else(|| KernelError::ChamferFailed {
                reason: format!("edge {} is not shared by two faces", id.0),
            })?;
            let too_far = || KernelError::ChamferFailed {
                reason: format!("distance {distance} does not fit edge {}", id.0),
            };
            let c1 = setback(&edge.curve, &first.inward, distance).ok_or_else(too_far)?;
            let c2 = setback(&edge.curve, &second.inward, distance).ok_or_else(too_far)?;

            let band = self.new_face(
                Surface::Ruled {
                    a: c1.clone(),
                    b: c2.clone(),
                },
                FaceRole::Blend,
                false,
            );
            let band_id = band.id;
            solid.faces.push(band);

            let e1 = self.new_edge(
                c1,
                vec![
                    first.clone(),
                    EdgeUse {
                        face: band_id,
                        inward: across(&first.inward, &second.inward),
                    },
                ],
            );
            let e2 = self.new_edge(
                c2,
                vec![
                    second.clone(),
                    EdgeUse {
                        face: band_id,
                        inward: across(&second.inward, &first.inward),
                    },
                ],
            );
            debug!(edge = id.0, distance, "chamfered edge");
            solid.edges.push(e1);
            solid.edges.push(e2);
        }
        Ok(solid)
    }

    pub(crate) fn fillet_solid(
        &mut self,
        mut solid: RefSolid,
        edges: &[EdgeId],
        radius: f64,
    ) -> Result<RefSolid, KernelError> {
        for id in unique(edges) {
            let edge = take_edge(&mut solid, id)?;
            let (first, second) = shared_faces(&edge).ok_or_else(|| KernelError::FilletFailed {
                reason: format!("edge {} is not shared by two faces", id.0),
            })?;
            let (Curve::Line { start, end }, Inward::Fixed(w1), Inward::Fixed(w2)) =
                (&edge.curve, first.inward, second.inward)
            else {
                return Err(KernelError::FilletFailed {
                    reason: format!("edge {} is not straight", id.0),
                });
            };
            let (Some(w1), Some(w2)) = (w1.normalized(), w2.normalized()) else {
                return Err(KernelError::FilletFailed {
                    reason: format!("edge {} has degenerate neighbours", id.0),
                });
            };
            let opening = w1.angle_to(&w2);
            if !(1e-3..PI - 1e-3).contains(&opening) {
                return Err(KernelError::FilletFailed {
                    reason: format!("faces at edge {} are tangent", id.0),
                });
            }
            let Some(bisector) = (w1 + w2).normalized() else {
                return Err(KernelError::FilletFailed {
                    reason: format!("faces at edge {} are tangent", id.0),
                });
            };
            let half = opening / 2.0;
            let tangent_offset = radius / half.tan();
            let center_offset = bisector * (radius / half.sin());
            let from = w1 * tangent_offset - center_offset;
            let to = w2 * tangent_offset - center_offset;

            let band = self.new_face(
                Surface::Rolled {
                    spine_start: *start + center_offset,
                    spine_end: *end + center_offset,
                    from,
                    to,
                },
                FaceRole::Blend,
                false,
            );
            let band_id = band.id;
            solid.faces.push(band);

            let along_arc = |a: Vec3, b: Vec3| {
                let unit = a / radius;
                (b - unit * b.dot(&unit)).normalized().unwrap_or(Vec3::ZERO)
            };
            let t1 = self.new_edge(
                edge.curve.translated(w1 * tangent_offset),
                vec![
                    EdgeUse {
                        face: first.face,
                        inward: Inward::Fixed(w1),
                    },
                    EdgeUse {
                        face: band_id,
                        inward: Inward::Fixed(along_arc(from, to)),
                    },
                ],
            );
            let t2 = self.new_edge(
                edge.curve.translated(w2 * tangent_offset),
                vec![
                    EdgeUse {
                        face: second.face,
                        inward: Inward::Fixed(w2),
                    },
                    EdgeUse {
                        face: band_id,
                        inward: Inward::Fixed(along_arc(to, from)),
                    },
                ],
            );
            debug!(edge = id.0, radius, setback = tangent_offset, "filleted edge");
            solid.edges.push(t1);
            solid.edges.push(t2);
        }
        Ok(solid)
    }
}
