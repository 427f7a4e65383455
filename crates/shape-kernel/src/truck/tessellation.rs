//! Per-face triangulation through truck-meshalgo.

use part_geom::{Point3d, Transform};
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;
use truck_modeling::topology::{Edge, Solid};
use truck_modeling::{BoundedCurve, EuclideanSpace, InnerSpace, ParametricCurve};

use super::build;
use crate::types::FaceTriangulation;

/// Triangulate `solid` and return one mesh per face, in face iteration
/// order. Faces truck could not mesh come back as `None`.
pub(super) fn face_meshes(solid: &Solid, tolerance: f64) -> Vec<Option<PolygonMesh>> {
    let meshed = solid.triangulation(tolerance);
    meshed
        .boundaries()
        .iter()
        .flat_map(|shell| shell.face_iter())
        .map(|face| {
            let mut mesh: PolygonMesh = face.surface()?;
            // Inverted faces carry the mesh of the underlying surface.
            if !face.orientation() {
                mesh.invert();
            }
            Some(mesh)
        })
        .collect()
}

pub(super) fn to_face_triangulation(mesh: &PolygonMesh) -> FaceTriangulation {
    FaceTriangulation {
        nodes: mesh.positions().iter().map(|p| build::from_point(*p)).collect(),
        triangles: mesh
            .tri_faces()
            .iter()
            .map(|tri| [tri[0].pos, tri[1].pos, tri[2].pos])
            .collect(),
        location: Transform::identity(),
    }
}

/// Corners of every triangle of a face mesh.
pub(super) fn mesh_triangles(mesh: &PolygonMesh) -> impl Iterator<Item = [Point3d; 3]> + '_ {
    let positions = mesh.positions();
    mesh.tri_faces().iter().map(move |tri| {
        [
            build::from_point(positions[tri[0].pos]),
            build::from_point(positions[tri[1].pos]),
            build::from_point(positions[tri[2].pos]),
        ]
    })
}

/// Enclosed volume, negative when the boundary faces inward.
pub(super) fn signed_volume(solid: &Solid, tolerance: f64) -> f64 {
    let sum: f64 = face_meshes(solid, tolerance)
        .iter()
        .flatten()
        .map(|mesh| {
            let positions = mesh.positions();
            mesh.tri_faces()
                .iter()
                .map(|tri| {
                    let a = positions[tri[0].pos].to_vec();
                    let b = positions[tri[1].pos].to_vec();
                    let c = positions[tri[2].pos].to_vec();
                    a.dot(b.cross(c))
                })
                .sum::<f64>()
        })
        .sum();
    sum / 6.0
}

/// `samples` evenly spaced parameter values along an edge, ends included.
pub(super) fn sample_edge(edge: &Edge, samples: usize) -> Vec<Point3d> {
    let curve = edge.oriented_curve();
    let (t0, t1) = curve.range_tuple();
    let n = samples.max(2) - 1;
    (0..=n)
        .map(|i| {
            let t = t0 + (t1 - t0) * i as f64 / n as f64;
            build::from_point(curve.subs(t))
        })
        .collect()
}

#[cfg(test)]
pub(super) fn mesh_area(mesh: &FaceTriangulation) -> f64 {
    mesh.triangles
        .iter()
        .map(|t| {
            let (a, b, c) = (mesh.nodes[t[0]], mesh.nodes[t[1]], mesh.nodes[t[2]]);
            (b - a).cross(&(c - a)).length() * 0.5
        })
        .sum()
}
