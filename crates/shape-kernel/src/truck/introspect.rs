//! KernelIntrospect for TruckKernel.
//!
//! truck edges after booleans are NURBS approximations, so edge geometry
//! is recovered by sampling the curve and fitting a line or a circle.

use std::f64::consts::TAU;

use part_geom::{Point3d, Vec3};
use truck_modeling::topology::Edge;

use super::{tessellation, Body, TruckKernel, EDGE_BASE, ENTITY_STRIDE};
use crate::region::CONNECT_TOLERANCE;
use crate::traits::KernelIntrospect;
use crate::types::*;

/// Samples taken along an edge for classification.
pub(super) const EDGE_SAMPLES: usize = 33;

/// Fit tolerance, relative to the extent of the sampled points.
const FIT_TOLERANCE: f64 = 1e-3;

fn face_id(key: u64, index: usize) -> FaceId {
    FaceId(key * ENTITY_STRIDE + index as u64)
}

fn edge_id(key: u64, index: usize) -> EdgeId {
    EdgeId(key * ENTITY_STRIDE + EDGE_BASE + index as u64)
}

impl TruckKernel {
    fn decode(&self, id: u64) -> Option<(&Body, u64, u64)> {
        let key = id / ENTITY_STRIDE;
        self.body(key).map(|body| (body, key, id % ENTITY_STRIDE))
    }
}

impl Body {
    /// The truck edge behind an [`EdgeId`], given the key this body is stored under.
    pub(super) fn edge(&self, key: u64, id: EdgeId) -> Option<Edge> {
        let local = id.0.checked_sub(key * ENTITY_STRIDE + EDGE_BASE)?;
        if local >= EDGE_BASE {
            return None;
        }
        self.edges().into_iter().nth(local as usize)
    }
}

impl KernelIntrospect for TruckKernel {
    fn list_edges(&self, solid: &SolidHandle) -> Vec<EdgeId> {
        let key = solid.key();
        self.body(key)
            .map(|b| (0..b.edges().len()).map(|i| edge_id(key, i)).collect())
            .unwrap_or_default()
    }

    fn list_faces(&self, solid: &SolidHandle) -> Vec<FaceId> {
        let key = solid.key();
        self.body(key)
            .map(|b| (0..b.faces().count()).map(|i| face_id(key, i)).collect())
            .unwrap_or_default()
    }

    fn edge_curve(&self, edge: EdgeId) -> Option<EdgeCurve> {
        let (body, key, _) = self.decode(edge.0)?;
        let edge = body.edge(key, edge)?;
        Some(classify_points(&tessellation::sample_edge(&edge, EDGE_SAMPLES)))
    }

    fn face_triangulation(&self, face: FaceId) -> Option<FaceTriangulation> {
        let (body, _, local) = self.decode(face.0)?;
        if local >= EDGE_BASE {
            return None;
        }
        body.meshes.get(local as usize)?.clone()
    }
}

/// Center, unit normal and radius of the circle through three points.
fn circumcircle(a: Point3d, b: Point3d, c: Point3d) -> Option<(Point3d, Vec3, f64)> {
    let u = b - a;
    let v = c - a;
    let w = u.cross(&v);
    let w2 = w.dot(&w);
    if w2 <= f64::EPSILON * u.dot(&u) * v.dot(&v) {
        return None;
    }
    let offset = (v.cross(&w) * u.dot(&u) + w.cross(&u) * v.dot(&v)) / (2.0 * w2);
    Some((a + offset, w.normalized()?, offset.length()))
}

fn signed_angle(from: Vec3, to: Vec3, axis: &Vec3) -> f64 {
    from.cross(&to).dot(axis).atan2(from.dot(&to))
}

/// Classify an ordered run of curve samples as a line, a circle or arc,
/// or neither. Arcs report a positive sweep about their axis.
pub(crate) fn classify_points(points: &[Point3d]) -> EdgeCurve {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return EdgeCurve::Other;
    };
    let extent = points
        .iter()
        .map(|p| p.distance_to(&first))
        .fold(0.0f64, f64::max);
    if extent <= CONNECT_TOLERANCE {
        return EdgeCurve::Other;
    }
    let tol = FIT_TOLERANCE * extent;
    let closed = first.distance_to(&last) <= tol;

    if !closed {
        if let Some(dir) = (last - first).normalized() {
            if points
                .iter()
                .all(|p| (*p - first).reject_from(&dir).length() <= tol)
            {
                return EdgeCurve::Line { start: first, end: last };
            }
        }
    }

    let n = points.len();
    if n < 3 {
        return EdgeCurve::Other;
    }
    let (a, b, c) = if closed {
        (points[0], points[n / 3], points[2 * n / 3])
    } else {
        (first, points[n / 2], last)
    };
    let Some((center, axis, radius)) = circumcircle(a, b, c) else {
        return EdgeCurve::Other;
    };
    let on_circle = points.iter().all(|p| {
        let d = *p - center;
        d.dot(&axis).abs() <= tol && (d.length() - radius).abs() <= tol
    });
    if !on_circle {
        return EdgeCurve::Other;
    }
    let sweep = if closed {
        TAU
    } else {
        points
            .windows(2)
            .map(|w| signed_angle(w[0] - center, w[1] - center, &axis))
            .sum()
    };
    EdgeCurve::Circle {
        center,
        axis,
        radius,
        start: first,
        sweep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arc_points(center: Point3d, radius: f64, from: f64, to: f64, n: usize) -> Vec<Point3d> {
        (0..=n)
            .map(|i| {
                let a = from + (to - from) * i as f64 / n as f64;
                center + Vec3::new(radius * a.cos(), radius * a.sin(), 0.0)
            })
            .collect()
    }

    #[test]
    fn test_collinear_points_are_a_line() {
        let points: Vec<Point3d> = (0..5)
            .map(|i| Point3d::new(i as f64, 2.0 * i as f64, 1.0))
            .collect();
        assert_eq!(
            classify_points(&points),
            EdgeCurve::Line {
                start: points[0],
                end: points[4]
            }
        );
    }

    #[test]
    fn test_full_circle() {
        let center = Point3d::new(1.0, -2.0, 3.0);
        let points = arc_points(center, 4.0, 0.0, TAU, 32);
        match classify_points(&points) {
            EdgeCurve::Circle { center: c, axis, radius, sweep, .. } => {
                assert!(c.distance_to(&center) < 1e-9);
                assert_relative_eq!(radius, 4.0, epsilon = 1e-9);
                assert_relative_eq!(axis.z, 1.0, epsilon = 1e-9);
                assert_relative_eq!(sweep, TAU);
            }
            other => panic!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn test_clockwise_arc_reports_positive_sweep_about_flipped_axis() {
        let points = arc_points(Point3d::ORIGIN, 2.0, 0.0, -1.5, 20);
        match classify_points(&points) {
            EdgeCurve::Circle { axis, sweep, start, .. } => {
                assert_relative_eq!(axis.z, -1.0, epsilon = 1e-9);
                assert_relative_eq!(sweep, 1.5, epsilon = 1e-9);
                assert_eq!(start, points[0]);
            }
            other => panic!("expected an arc, got {other:?}"),
        }
    }

    #[test]
    fn test_parabola_is_other() {
        let points: Vec<Point3d> = (0..=20)
            .map(|i| {
                let x = i as f64 / 10.0 - 1.0;
                Point3d::new(x, x * x, 0.0)
            })
            .collect();
        assert_eq!(classify_points(&points), EdgeCurve::Other);
    }

    #[test]
    fn test_coincident_points_are_other() {
        let p = Point3d::new(1.0, 1.0, 1.0);
        assert_eq!(classify_points(&[p, p, p]), EdgeCurve::Other);
    }
}
