//! Entity records held by the reference kernel.

use part_geom::{BoundingBox, Point3d, Transform, Vec3};

use crate::curve::Curve;
use crate::region::PlanarRegion;
use crate::types::{EdgeId, FaceId};

/// Direction, along an adjacent face, pointing from an edge into that face.
///
/// Blends use it to place their setback edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Inward {
    /// Constant direction, used for straight edges.
    Fixed(Vec3),
    /// Components in the local frame of a circular edge: `radial` along the
    /// outward radius at each point, `axial` along the circle axis.
    Polar { radial: f64, axial: f64 },
}

impl Inward {
    pub(crate) fn transformed(&self, t: &Transform) -> Inward {
        match self {
            Inward::Fixed(v) => Inward::Fixed(t.transform_vector(v)),
            Inward::Polar { .. } => *self,
        }
    }

    pub(crate) fn negated(&self) -> Inward {
        match self {
            Inward::Fixed(v) => Inward::Fixed(-*v),
            Inward::Polar { radial, axial } => Inward::Polar {
                radial: -radial,
                axial: -axial,
            },
        }
    }

    /// Express a model-space direction at the start of `curve`.
    pub(crate) fn at_curve_start(curve: &Curve, dir: Vec3) -> Inward {
        match curve {
            Curve::Line { .. } => Inward::Fixed(dir),
            Curve::Arc { axis, .. } => {
                let radial = curve.radial_at(0.0).unwrap_or(Vec3::X);
                Inward::Polar {
                    radial: dir.dot(&radial),
                    axial: dir.dot(axis),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EdgeUse {
    pub face: FaceId,
    pub inward: Inward,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RefEdge {
    pub id: EdgeId,
    pub curve: Curve,
    pub uses: Vec<EdgeUse>,
}

/// Underlying surface of a face, in the face's local frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Surface {
    Planar(PlanarRegion),
    /// Sweep of `base` along `vector`.
    Extruded { base: Curve, vector: Vec3 },
    /// Full revolution of `generatrix` about the axis line.
    Revolved {
        generatrix: Curve,
        axis_origin: Point3d,
        axis: Vec3,
    },
    /// Straight lines joining equal parameters of `a` and `b`.
    Ruled { a: Curve, b: Curve },
    /// Circular-section band: the arc from `from` to `to` (offsets from the
    /// spine) swept along the straight spine of arc centers.
    Rolled {
        spine_start: Point3d,
        spine_end: Point3d,
        from: Vec3,
        to: Vec3,
    },
}

/// Where a face came from, used when a solid is subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaceRole {
    Cap,
    Lateral,
    Blend,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FaceMesh {
    pub tolerance: f64,
    pub nodes: Vec<Point3d>,
    pub triangles: Vec<[usize; 3]>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RefFace {
    pub id: FaceId,
    pub surface: Surface,
    pub role: FaceRole,
    pub location: Transform,
    /// Triangles are emitted with flipped winding.
    pub reversed: bool,
    pub mesh: Option<FaceMesh>,
}

impl RefFace {
    /// Model-space bounding box of the face boundary.
    pub(crate) fn bounding_box(&self) -> BoundingBox {
        let local = match &self.surface {
            Surface::Planar(region) => region
                .loops()
                .flatten()
                .map(Curve::bounding_box)
                .fold(BoundingBox::empty(), |acc, bb| acc.union(&bb)),
            Surface::Extruded { base, vector } => {
                let bb = base.bounding_box();
                bb.union(&base.translated(*vector).bounding_box())
            }
            Surface::Revolved {
                generatrix,
                axis_origin,
                axis,
            } => generatrix
                .sample(1e-3)
                .iter()
                .map(|p| circle_box(p, axis_origin, axis))
                .fold(BoundingBox::empty(), |acc, bb| acc.union(&bb)),
            Surface::Ruled { a, b } => a.bounding_box().union(&b.bounding_box()),
            Surface::Rolled {
                spine_start,
                spine_end,
                from,
                to,
            } => BoundingBox::from_points(&[
                *spine_start + *from,
                *spine_start + *to,
                *spine_end + *from,
                *spine_end + *to,
            ]),
        };
        transform_box(&local, &self.location)
    }
}

/// Bounding box of the circle swept by `p` about the axis line.
fn circle_box(p: &Point3d, axis_origin: &Point3d, axis: &Vec3) -> BoundingBox {
    let center = *axis_origin + *axis * (*p - *axis_origin).dot(axis);
    let radius = p.distance_to(&center);
    let extent = Vec3::new(
        radius * (1.0 - axis.x * axis.x).max(0.0).sqrt(),
        radius * (1.0 - axis.y * axis.y).max(0.0).sqrt(),
        radius * (1.0 - axis.z * axis.z).max(0.0).sqrt(),
    );
    BoundingBox::new(center - extent, center + extent)
}

fn transform_box(bb: &BoundingBox, t: &Transform) -> BoundingBox {
    if bb.is_empty() || t.is_identity() {
        return *bb;
    }
    let (lo, hi) = (bb.min, bb.max);
    let corners = [
        Point3d::new(lo.x, lo.y, lo.z),
        Point3d::new(hi.x, lo.y, lo.z),
        Point3d::new(lo.x, hi.y, lo.z),
        Point3d::new(hi.x, hi.y, lo.z),
        Point3d::new(lo.x, lo.y, hi.z),
        Point3d::new(hi.x, lo.y, hi.z),
        Point3d::new(lo.x, hi.y, hi.z),
        Point3d::new(hi.x, hi.y, hi.z),
    ];
    let moved: Vec<Point3d> = corners.iter().map(|c| t.transform_point(c)).collect();
    BoundingBox::from_points(&moved)
}

/// Edges and faces making up one solid (or compound).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RefSolid {
    pub edges: Vec<RefEdge>,
    pub faces: Vec<RefFace>,
}

impl RefSolid {
    pub(crate) fn bounding_box(&self) -> BoundingBox {
        self.faces
            .iter()
            .map(RefFace::bounding_box)
            .fold(BoundingBox::empty(), |acc, bb| acc.union(&bb))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub(crate) fn absorb(&mut self, other: RefSolid) {
        self.edges.extend(other.edges);
        self.faces.extend(other.faces);
    }
}
