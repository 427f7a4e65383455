//! Per-face triangulation in the face's local frame.
//!
//! Planar faces go through a constrained Delaunay triangulation of their
//! sampled boundary loops; swept and blend faces are sampled on a grid.

use std::f64::consts::TAU;

use part_geom::{Point2d, Point3d, Transform, Vec3};
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};

use super::topology::{FaceMesh, RefFace, Surface};
use crate::region::PlanarRegion;
use crate::curve::Curve;
use crate::types::KernelError;

/// Triangles with a smaller doubled area are dropped.
const MIN_DOUBLE_AREA: f64 = 1e-14;

pub(crate) fn mesh_face(face: &RefFace, tolerance: f64) -> Result<FaceMesh, KernelError> {
    let (nodes, mut triangles) = match &face.surface {
        Surface::Planar(region) => mesh_planar(region, tolerance)?,
        Surface::Extruded { base, vector } => {
            let n = base.segment_count(tolerance);
            let lifted = base.translated(*vector);
            strip(&base.sample_n(n), &lifted.sample_n(n))
        }
        Surface::Ruled { a, b } => {
            let n = a.segment_count(tolerance).max(b.segment_count(tolerance));
            strip(&a.sample_n(n), &b.sample_n(n))
        }
        Surface::Revolved {
            generatrix,
            axis_origin,
            axis,
        } => mesh_revolved(generatrix, *axis_origin, *axis, tolerance),
        Surface::Rolled {
            spine_start,
            spine_end,
            from,
            to,
        } => {
            let radius = from.length();
            let opening = from.angle_to(to);
            let rotation_axis = from.cross(to).normalized().unwrap_or(Vec3::Z);
            let arc = Curve::Arc {
                center: Point3d::ORIGIN,
                axis: rotation_axis,
                ref_dir: from.normalized().unwrap_or(Vec3::X),
                radius,
                sweep: opening,
            };
            let offsets = arc.sample(tolerance);
            let row = |base: Point3d| -> Vec<Point3d> {
                offsets.iter().map(|o| base + o.to_vec3()).collect()
            };
            strip(&row(*spine_start), &row(*spine_end))
        }
    };
    if face.reversed {
        for tri in &mut triangles {
            tri.swap(1, 2);
        }
    }
    Ok(FaceMesh {
        tolerance,
        nodes,
        triangles,
    })
}

/// Two rows of equal length joined by quads split into triangles.
fn strip(lower: &[Point3d], upper: &[Point3d]) -> (Vec<Point3d>, Vec<[usize; 3]>) {
    let n = lower.len().min(upper.len());
    let mut nodes = Vec::with_capacity(2 * n);
    nodes.extend_from_slice(&lower[..n]);
    nodes.extend_from_slice(&upper[..n]);
    let mut triangles = Vec::with_capacity(2 * n);
    for i in 0..n.saturating_sub(1) {
        let (a, b, c, d) = (i, i + 1, n + i + 1, n + i);
        push_if_proper(&nodes, &mut triangles, [a, b, c]);
        push_if_proper(&nodes, &mut triangles, [a, c, d]);
    }
    (nodes, triangles)
}

fn push_if_proper(nodes: &[Point3d], triangles: &mut Vec<[usize; 3]>, tri: [usize; 3]) {
    let [a, b, c] = tri.map(|i| nodes[i]);
    if (b - a).cross(&(c - a)).length() > MIN_DOUBLE_AREA {
        triangles.push(tri);
    }
}

fn mesh_revolved(
    generatrix: &Curve,
    axis_origin: Point3d,
    axis: Vec3,
    tolerance: f64,
) -> (Vec<Point3d>, Vec<[usize; 3]>) {
    let profile = generatrix.sample(tolerance);
    let max_radius = profile
        .iter()
        .map(|p| (*p - axis_origin).reject_from(&axis).length())
        .fold(0.0f64, f64::max);
    let around = Curve::Arc {
        center: Point3d::ORIGIN,
        axis: Vec3::Z,
        ref_dir: Vec3::X,
        radius: max_radius.max(tolerance),
        sweep: TAU,
    }
    .segment_count(tolerance);

    let rows: Vec<Vec<Point3d>> = (0..=around)
        .map(|k| {
            let rotation = Transform::rotation_about(axis_origin, axis, TAU * k as f64 / around as f64);
            profile.iter().map(|p| rotation.transform_point(p)).collect()
        })
        .collect();

    let mut nodes = Vec::new();
    let mut triangles = Vec::new();
    for pair in rows.windows(2) {
        let (sub_nodes, sub_tris) = strip(&pair[0], &pair[1]);
        let offset = nodes.len();
        nodes.extend(sub_nodes);
        triangles.extend(sub_tris.into_iter().map(|t| t.map(|i| i + offset)));
    }
    (nodes, triangles)
}

fn mesh_planar(
    region: &PlanarRegion,
    tolerance: f64,
) -> Result<(Vec<Point3d>, Vec<[usize; 3]>), KernelError> {
    let x_dir = region.x_dir;
    let y_dir = region.y_dir();
    let project = |p: &Point3d| {
        let d = *p - region.origin;
        Point2d::new(d.dot(&x_dir), d.dot(&y_dir))
    };

    let loops: Vec<Vec<Point2d>> = region
        .loops()
        .map(|chain| {
            chain
                .iter()
                .flat_map(|curve| {
                    let samples = curve.sample(tolerance);
                    let keep = samples.len() - 1;
                    samples.into_iter().take(keep)
                })
                .map(|p| project(&p))
                .collect()
        })
        .collect();

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    for polygon in &loops {
        let mut handles = Vec::with_capacity(polygon.len());
        for p in polygon {
            let handle = cdt
                .insert(SpadePoint2::new(p.x, p.y))
                .map_err(|e| KernelError::TriangulationFailed {
                    reason: format!("cannot insert boundary point: {e:?}"),
                })?;
            handles.push(handle);
        }
        for i in 0..handles.len() {
            let (from, to) = (handles[i], handles[(i + 1) % handles.len()]);
            if from == to {
                continue;
            }
            if !cdt.can_add_constraint(from, to) {
                return Err(KernelError::TriangulationFailed {
                    reason: "boundary edges cross".to_string(),
                });
            }
            cdt.add_constraint(from, to);
        }
    }

    let nodes: Vec<Point3d> = cdt
        .vertices()
        .map(|v| {
            let p = v.position();
            region.origin + x_dir * p.x + y_dir * p.y
        })
        .collect();

    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        let [a, b, c] = face.vertices();
        let (pa, pb, pc) = (a.position(), b.position(), c.position());
        let centroid = Point2d::new((pa.x + pb.x + pc.x) / 3.0, (pa.y + pb.y + pc.y) / 3.0);
        if !inside(&loops, centroid) {
            continue;
        }
        let tri = [a.fix().index(), b.fix().index(), c.fix().index()];
        let ccw = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x) > 0.0;
        triangles.push(if ccw { tri } else { [tri[0], tri[2], tri[1]] });
    }
    Ok((nodes, triangles))
}

/// Even-odd containment over all boundary loops.
fn inside(loops: &[Vec<Point2d>], p: Point2d) -> bool {
    let mut crossings = 0usize;
    for polygon in loops {
        for i in 0..polygon.len() {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    crossings += 1;
                }
            }
        }
    }
    crossings % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::topology::FaceRole;
    use crate::types::FaceId;

    fn square_with_hole() -> PlanarRegion {
        let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let outer = (0..4)
            .map(|i| {
                let (a, b) = (corners[i], corners[(i + 1) % 4]);
                Curve::Line {
                    start: Point3d::new(a.0, a.1, 0.0),
                    end: Point3d::new(b.0, b.1, 0.0),
                }
            })
            .collect();
        let hole = vec![Curve::Arc {
            center: Point3d::new(5.0, 5.0, 0.0),
            axis: Vec3::Z,
            ref_dir: Vec3::X,
            radius: 2.0,
            sweep: -TAU,
        }];
        PlanarRegion {
            origin: Point3d::ORIGIN,
            normal: Vec3::Z,
            x_dir: Vec3::X,
            outer,
            holes: vec![hole],
        }
    }

    #[test]
    fn test_planar_mesh_skips_hole() {
        let (nodes, triangles) = mesh_planar(&square_with_hole(), 0.05).unwrap();
        assert!(!triangles.is_empty());
        let area: f64 = triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| nodes[i]);
                (b - a).cross(&(c - a)).z / 2.0
            })
            .sum();
        let expected = 100.0 - std::f64::consts::PI * 4.0;
        assert!((area - expected).abs() < 0.5, "area {area}");
    }

    #[test]
    fn test_reversed_face_flips_winding() {
        let face = RefFace {
            id: FaceId(1),
            surface: Surface::Planar(square_with_hole()),
            role: FaceRole::Cap,
            location: Transform::identity(),
            reversed: true,
            mesh: None,
        };
        let mesh = mesh_face(&face, 0.1).unwrap();
        let [a, b, c] = mesh.triangles[0].map(|i| mesh.nodes[i]);
        assert!((b - a).cross(&(c - a)).z < 0.0);
    }

    #[test]
    fn test_revolved_disk_drops_axis_slivers() {
        let generatrix = Curve::Line {
            start: Point3d::new(0.0, 0.0, 0.0),
            end: Point3d::new(0.0, 5.0, 0.0),
        };
        let (nodes, triangles) = mesh_revolved(&generatrix, Point3d::ORIGIN, Vec3::X, 0.1);
        for t in &triangles {
            let [a, b, c] = t.map(|i| nodes[i]);
            assert!((b - a).cross(&(c - a)).length() > MIN_DOUBLE_AREA);
        }
        assert!(!triangles.is_empty());
    }
}
