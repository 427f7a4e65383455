//! The two sweeps (extrude, revolve) over validated profile regions.

use std::f64::consts::TAU;

use part_geom::{Point3d, Vec3};
use tracing::debug;

use super::topology::*;
use super::ReferenceKernel;
use crate::curve::Curve;
use crate::region::{PlanarRegion, CONNECT_TOLERANCE};
use crate::types::{EdgeId, FaceId, KernelError};

impl ReferenceKernel {
    pub(crate) fn new_edge(&mut self, curve: Curve, uses: Vec<EdgeUse>) -> RefEdge {
        RefEdge {
            id: EdgeId(self.alloc_id()),
            curve,
            uses,
        }
    }

    pub(crate) fn new_face(&mut self, surface: Surface, role: FaceRole, reversed: bool) -> RefFace {
        RefFace {
            id: FaceId(self.alloc_id()),
            surface,
            role,
            location: part_geom::Transform::identity(),
            reversed,
            mesh: None,
        }
    }

    /// Prism topology: two caps, one lateral face per boundary curve, the
    /// boundary curves on both caps and one straight edge per loop vertex.
    pub(crate) fn build_extrusion(
        &mut self,
        region: PlanarRegion,
        vector: Vec3,
    ) -> Result<RefSolid, KernelError> {
        let (dir, along) = region.extrusion_direction(vector)?;
        let n = region.normal;

        let mut solid = RefSolid::default();
        let top_region = region.translated(vector);
        let bottom = self.new_face(Surface::Planar(region.clone()), FaceRole::Cap, along > 0.0);
        let top = self.new_face(Surface::Planar(top_region), FaceRole::Cap, along < 0.0);
        let (bottom_id, top_id) = (bottom.id, top.id);
        solid.faces.push(bottom);
        solid.faces.push(top);

        for chain in region.loops() {
            let sides: Vec<FaceId> = chain
                .iter()
                .map(|curve| {
                    let side = self.new_face(
                        Surface::Extruded {
                            base: curve.clone(),
                            vector,
                        },
                        FaceRole::Lateral,
                        false,
                    );
                    let id = side.id;
                    solid.faces.push(side);
                    id
                })
                .collect();

            for (i, curve) in chain.iter().enumerate() {
                let into_cap = n.cross(&curve.tangent_at(0.0));
                let lifted = curve.translated(vector);
                let bottom_edge = self.new_edge(
                    curve.clone(),
                    vec![
                        EdgeUse {
                            face: bottom_id,
                            inward: Inward::at_curve_start(curve, into_cap),
                        },
                        EdgeUse {
                            face: sides[i],
                            inward: Inward::at_curve_start(curve, dir),
                        },
                    ],
                );
                let top_edge = self.new_edge(
                    lifted.clone(),
                    vec![
                        EdgeUse {
                            face: top_id,
                            inward: Inward::at_curve_start(&lifted, into_cap),
                        },
                        EdgeUse {
                            face: sides[i],
                            inward: Inward::at_curve_start(&lifted, -dir),
                        },
                    ],
                );
                solid.edges.push(bottom_edge);
                solid.edges.push(top_edge);

                let prev = (i + chain.len() - 1) % chain.len();
                let corner = curve.start();
                let vertical = self.new_edge(
                    Curve::Line {
                        start: corner,
                        end: corner + vector,
                    },
                    vec![
                        EdgeUse {
                            face: sides[i],
                            inward: Inward::Fixed(curve.tangent_at(0.0)),
                        },
                        EdgeUse {
                            face: sides[prev],
                            inward: Inward::Fixed(-chain[prev].tangent_at(1.0)),
                        },
                    ],
                );
                solid.edges.push(vertical);
            }
        }
        debug!(
            faces = solid.faces.len(),
            edges = solid.edges.len(),
            "built extrusion"
        );
        Ok(solid)
    }

    /// Solid of revolution: one face per profile curve off the axis and one
    /// full circle per profile vertex off the axis.
    pub(crate) fn build_revolution(
        &mut self,
        region: PlanarRegion,
        axis_origin: Point3d,
        axis_direction: Vec3,
    ) -> Result<RefSolid, KernelError> {
        let axis = region.revolution_axis(axis_origin, axis_direction)?;
        let radial = |p: &Point3d| (*p - axis_origin).reject_from(&axis).length();

        let mut solid = RefSolid::default();
        for chain in region.loops() {
            let faces: Vec<Option<FaceId>> = chain
                .iter()
                .map(|curve| {
                    let on_axis = [0.0, 0.5, 1.0]
                        .iter()
                        .all(|&t| radial(&curve.point_at(t)) <= CONNECT_TOLERANCE);
                    if on_axis {
                        return None;
                    }
                    let face = self.new_face(
                        Surface::Revolved {
                            generatrix: curve.clone(),
                            axis_origin,
                            axis,
                        },
                        FaceRole::Lateral,
                        false,
                    );
                    let id = face.id;
                    solid.faces.push(face);
                    Some(id)
                })
                .collect();

            for (i, curve) in chain.iter().enumerate() {
                let p = curve.start();
                let center = axis_origin + axis * (p - axis_origin).dot(&axis);
                let radius = p.distance_to(&center);
                if radius <= CONNECT_TOLERANCE {
                    continue;
                }
                let Some(ref_dir) = (p - center).normalized() else {
                    continue;
                };
                let polar = |dir: Vec3| Inward::Polar {
                    radial: dir.dot(&ref_dir),
                    axial: dir.dot(&axis),
                };
                let prev = (i + chain.len() - 1) % chain.len();
                let mut uses = Vec::with_capacity(2);
                if let Some(face) = faces[prev] {
                    uses.push(EdgeUse {
                        face,
                        inward: polar(-chain[prev].tangent_at(1.0)),
                    });
                }
                if let Some(face) = faces[i] {
                    uses.push(EdgeUse {
                        face,
                        inward: polar(curve.tangent_at(0.0)),
                    });
                }
                let circle = self.new_edge(
                    Curve::Arc {
                        center,
                        axis,
                        ref_dir,
                        radius,
                        sweep: TAU,
                    },
                    uses,
                );
                solid.edges.push(circle);
            }
        }
        if solid.is_empty() {
            return Err(KernelError::DegenerateGeometry {
                reason: "profile lies on the revolution axis".to_string(),
            });
        }
        debug!(
            faces = solid.faces.len(),
            edges = solid.edges.len(),
            "built revolution"
        );
        Ok(solid)
    }
}
