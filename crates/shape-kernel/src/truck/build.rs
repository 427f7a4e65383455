//! Conversions between kernel geometry and truck topology.

use std::f64::consts::TAU;

use part_geom::{Point3d, Transform, Vec3};
use truck_modeling::topology::{Edge, Face, Solid, Vertex, Wire};
use truck_modeling::{builder, Matrix4, Point3, Rad, Vector3};

use super::tessellation;
use crate::curve::Curve;
use crate::region::PlanarRegion;
use crate::types::KernelError;

/// Mesh tolerance used only to decide which way a fresh solid faces.
const ORIENTATION_TOLERANCE: f64 = 0.1;

pub(super) fn point(p: &Point3d) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

pub(super) fn vector(v: &Vec3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

pub(super) fn from_point(p: Point3) -> Point3d {
    Point3d::new(p.x, p.y, p.z)
}

/// `Transform` is column-major, as is `Matrix4::new`.
pub(super) fn matrix(t: &Transform) -> Matrix4 {
    let m = &t.m;
    #[rustfmt::skip]
    let matrix = Matrix4::new(
        m[0], m[1], m[2], m[3],
        m[4], m[5], m[6], m[7],
        m[8], m[9], m[10], m[11],
        m[12], m[13], m[14], m[15],
    );
    matrix
}

/// Determinant of the linear part.
pub(super) fn determinant(t: &Transform) -> f64 {
    let c0 = t.transform_vector(&Vec3::X);
    let c1 = t.transform_vector(&Vec3::Y);
    let c2 = t.transform_vector(&Vec3::Z);
    c0.dot(&c1.cross(&c2))
}

pub(super) fn face_count(solid: &Solid) -> usize {
    solid
        .boundaries()
        .iter()
        .map(|shell| shell.face_iter().count())
        .sum()
}

/// Flip `solid` if its boundary faces inward.
pub(super) fn outward(mut solid: Solid) -> Solid {
    if tessellation::signed_volume(&solid, ORIENTATION_TOLERANCE) < 0.0 {
        solid.not();
    }
    solid
}

/// Closed truck wire following a chain of curves. Consecutive edges share
/// their vertices so the wire is connected.
fn loop_wire(chain: &[Curve]) -> Wire {
    if let [curve @ Curve::Arc { center, axis, sweep, .. }] = chain {
        if curve.is_closed() {
            let v = builder::vertex(point(&curve.start()));
            return builder::rsweep(&v, point(center), vector(axis), Rad(TAU.copysign(*sweep)));
        }
    }
    let vertices: Vec<Vertex> = chain
        .iter()
        .map(|c| builder::vertex(point(&c.start())))
        .collect();
    let n = vertices.len();
    let edges: Vec<Edge> = chain
        .iter()
        .enumerate()
        .map(|(i, curve)| {
            let (v0, v1) = (&vertices[i], &vertices[(i + 1) % n]);
            match curve {
                Curve::Line { .. } => builder::line(v0, v1),
                Curve::Arc { .. } => builder::circle_arc(v0, v1, point(&curve.point_at(0.5))),
            }
        })
        .collect();
    Wire::from_iter(edges)
}

/// Planar truck face bounded by the region's loops.
pub(super) fn region_face(region: &PlanarRegion) -> Result<Face, KernelError> {
    let wires: Vec<Wire> = region.loops().map(|chain| loop_wire(chain)).collect();
    builder::try_attach_plane(&wires).map_err(|e| KernelError::DegenerateGeometry {
        reason: format!("failed to create planar face: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_matches_transform() {
        let t = Transform::rotation_about(Point3d::new(1.0, 2.0, 0.0), Vec3::Z, 0.7)
            .then(&Transform::translation(Vec3::new(0.5, -1.0, 3.0)));
        let p = Point3d::new(0.3, -4.0, 2.0);
        let expected = t.transform_point(&p);
        let m = matrix(&t);
        let got = m * point(&p).to_homogeneous();
        assert_relative_eq!(got.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(got.y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(got.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_has_negative_determinant() {
        assert!(determinant(&Transform::scaling(-1.0, 1.0, 1.0)) < 0.0);
        assert_relative_eq!(determinant(&Transform::rotation(Vec3::X, 1.0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_square_with_arc_side_gives_one_face() {
        let chain = vec![
            Curve::line(Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 0.0, 0.0)).unwrap(),
            Curve::arc(Point3d::new(2.0, 1.0, 0.0), Vec3::Z, Point3d::new(2.0, 0.0, 0.0), std::f64::consts::PI)
                .unwrap(),
            Curve::line(Point3d::new(2.0, 2.0, 0.0), Point3d::new(0.0, 2.0, 0.0)).unwrap(),
            Curve::line(Point3d::new(0.0, 2.0, 0.0), Point3d::new(0.0, 0.0, 0.0)).unwrap(),
        ];
        let region = crate::region::planar_region(chain, vec![]).unwrap();
        let face = region_face(&region).unwrap();
        assert_eq!(face.boundaries().len(), 1);
        assert_eq!(face.boundaries()[0].edge_iter().count(), 4);
    }
}
