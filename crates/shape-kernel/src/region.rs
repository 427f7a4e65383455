//! Wire chaining and planar profile regions, shared by both kernels.

use part_geom::{Point2d, Point3d, Transform, Vec3};

use crate::curve::Curve;
use crate::types::KernelError;

/// Endpoints closer than this are considered connected.
pub(crate) const CONNECT_TOLERANCE: f64 = 1e-6;

/// Sampling tolerance for validation polygons.
pub(crate) const VALIDATION_SAMPLING: f64 = 1e-3;

/// Order and orient curves so that each one starts where the previous ends.
pub(crate) fn chain_curves(curves: Vec<Curve>) -> Result<Vec<Curve>, KernelError> {
    if curves.is_empty() {
        return Err(KernelError::InvalidParameter {
            reason: "wire needs at least one edge".to_string(),
        });
    }
    let near = |a: &Point3d, b: &Point3d| a.distance_to(b) <= CONNECT_TOLERANCE;

    let mut chain: Vec<Curve> = Vec::with_capacity(curves.len());
    for (index, curve) in curves.into_iter().enumerate() {
        let Some(last) = chain.last() else {
            chain.push(curve);
            continue;
        };
        let tail = last.end();
        if near(&curve.start(), &tail) {
            chain.push(curve);
        } else if near(&curve.end(), &tail) {
            chain.push(curve.reversed());
        } else if index == 1 && (near(&curve.start(), &chain[0].start()) || near(&curve.end(), &chain[0].start())) {
            // First edge was given backwards.
            chain[0] = chain[0].reversed();
            let tail = chain[0].end();
            if near(&curve.start(), &tail) {
                chain.push(curve);
            } else {
                chain.push(curve.reversed());
            }
        } else {
            return Err(KernelError::DisconnectedWire { index });
        }
    }
    Ok(chain)
}

fn is_closed_chain(chain: &[Curve]) -> bool {
    match (chain.first(), chain.last()) {
        (Some(first), Some(last)) => {
            (chain.len() == 1 && first.is_closed())
                || first.start().distance_to(&last.end()) <= CONNECT_TOLERANCE
        }
        _ => false,
    }
}

fn reverse_chain(chain: &[Curve]) -> Vec<Curve> {
    chain.iter().rev().map(Curve::reversed).collect()
}

/// Sampled closed polygon of a loop, without the repeated closing point.
fn loop_polygon(chain: &[Curve]) -> Vec<Point3d> {
    let mut points = Vec::new();
    for curve in chain {
        let samples = curve.sample(VALIDATION_SAMPLING);
        points.extend_from_slice(&samples[..samples.len() - 1]);
    }
    points
}

/// Newell normal of a closed polygon, scaled by twice its area.
fn newell_normal(points: &[Point3d]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n = n + Vec3::new(
            (p.y - q.y) * (p.z + q.z),
            (p.z - q.z) * (p.x + q.x),
            (p.x - q.x) * (p.y + q.y),
        );
    }
    n * 0.5
}

struct PlaneFrame {
    origin: Point3d,
    normal: Vec3,
    x_dir: Vec3,
    y_dir: Vec3,
}

impl PlaneFrame {
    fn project(&self, p: &Point3d) -> Point2d {
        let d = *p - self.origin;
        Point2d::new(d.dot(&self.x_dir), d.dot(&self.y_dir))
    }

    fn distance(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }
}

fn orient(a: Point2d, b: Point2d, c: Point2d) -> f64 {
    (b - a).perp_dot(&(c - a))
}

fn on_segment(a: Point2d, b: Point2d, p: Point2d) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn segments_touch(a1: Point2d, a2: Point2d, b1: Point2d, b2: Point2d, eps: f64) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);
    let straddles = |p: f64, q: f64| (p > eps && q < -eps) || (p < -eps && q > eps);
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }
    (d1.abs() <= eps && on_segment(b1, b2, a1))
        || (d2.abs() <= eps && on_segment(b1, b2, a2))
        || (d3.abs() <= eps && on_segment(a1, a2, b1))
        || (d4.abs() <= eps && on_segment(a1, a2, b2))
}

/// True when any two non-adjacent edges of the loops touch or cross.
fn loops_intersect(loops: &[Vec<Point2d>], eps: f64) -> bool {
    let edges: Vec<(usize, usize, Point2d, Point2d)> = loops
        .iter()
        .enumerate()
        .flat_map(|(li, poly)| {
            (0..poly.len()).map(move |i| (li, i, poly[i], poly[(i + 1) % poly.len()]))
        })
        .collect();

    for (a, &(la, ia, a1, a2)) in edges.iter().enumerate() {
        for &(lb, ib, b1, b2) in &edges[a + 1..] {
            if la == lb {
                let n = loops[la].len();
                if ib == (ia + 1) % n || ia == (ib + 1) % n {
                    continue;
                }
            }
            if segments_touch(a1, a2, b1, b2, eps) {
                return true;
            }
        }
    }
    false
}

/// Validate a closed outer chain plus holes and normalize loop orientation.
pub(crate) fn planar_region(
    outer: Vec<Curve>,
    holes: Vec<Vec<Curve>>,
) -> Result<PlanarRegion, KernelError> {
    if !is_closed_chain(&outer) || holes.iter().any(|h| !is_closed_chain(h)) {
        return Err(KernelError::OpenWire);
    }

    let outer_poly = loop_polygon(&outer);
    let normal = newell_normal(&outer_poly)
        .normalized()
        .ok_or_else(|| KernelError::DegenerateGeometry {
            reason: "profile encloses no area".to_string(),
        })?;
    let origin = outer_poly[0];
    let x_dir = outer[0]
        .tangent_at(0.0)
        .reject_from(&normal)
        .normalized()
        .unwrap_or_else(|| normal.any_perpendicular());
    let frame = PlaneFrame {
        origin,
        normal,
        x_dir,
        y_dir: normal.cross(&x_dir),
    };

    let mut oriented_holes = Vec::with_capacity(holes.len());
    let mut hole_polys = Vec::with_capacity(holes.len());
    for hole in holes {
        let poly = loop_polygon(&hole);
        if newell_normal(&poly).dot(&normal) > 0.0 {
            let flipped = reverse_chain(&hole);
            hole_polys.push(loop_polygon(&flipped));
            oriented_holes.push(flipped);
        } else {
            hole_polys.push(poly);
            oriented_holes.push(hole);
        }
    }

    let scale = outer_poly
        .iter()
        .map(|p| p.distance_to(&origin))
        .fold(1.0f64, f64::max);
    let planar_tol = 1e-6 * scale;
    if outer_poly
        .iter()
        .chain(hole_polys.iter().flatten())
        .any(|p| frame.distance(p).abs() > planar_tol)
    {
        return Err(KernelError::NonPlanarProfile);
    }

    let flat: Vec<Vec<Point2d>> = std::iter::once(&outer_poly)
        .chain(hole_polys.iter())
        .map(|poly| poly.iter().map(|p| frame.project(p)).collect())
        .collect();
    if loops_intersect(&flat, 1e-12 * scale * scale) {
        return Err(KernelError::SelfIntersectingProfile);
    }

    Ok(PlanarRegion {
        origin,
        normal,
        x_dir,
        outer,
        holes: oriented_holes,
    })
}

/// Closed planar region: outer loop counter-clockwise about `normal`,
/// holes clockwise. Each loop is a chain of oriented curves.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanarRegion {
    pub origin: Point3d,
    pub normal: Vec3,
    pub x_dir: Vec3,
    pub outer: Vec<Curve>,
    pub holes: Vec<Vec<Curve>>,
}

impl PlanarRegion {
    pub(crate) fn loops(&self) -> impl Iterator<Item = &Vec<Curve>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    pub(crate) fn y_dir(&self) -> Vec3 {
        self.normal.cross(&self.x_dir)
    }

    /// Unit sweep direction and its component along the normal.
    pub(crate) fn extrusion_direction(&self, vector: Vec3) -> Result<(Vec3, f64), KernelError> {
        let dir = vector
            .normalized()
            .ok_or_else(|| KernelError::InvalidParameter {
                reason: "extrusion vector has zero length".to_string(),
            })?;
        let along = self.normal.dot(&dir);
        if along.abs() < 1e-9 {
            return Err(KernelError::DegenerateGeometry {
                reason: "extrusion vector lies in the profile plane".to_string(),
            });
        }
        Ok((dir, along))
    }

    /// Unit revolution axis. The axis must lie in the profile plane and
    /// leave the whole region on one side.
    pub(crate) fn revolution_axis(
        &self,
        axis_origin: Point3d,
        axis_direction: Vec3,
    ) -> Result<Vec3, KernelError> {
        let axis = axis_direction
            .normalized()
            .ok_or_else(|| KernelError::InvalidParameter {
                reason: "revolution axis has zero length".to_string(),
            })?;
        let n = self.normal;
        if n.dot(&axis).abs() > 1e-6 || (axis_origin - self.origin).dot(&n).abs() > 1e-6 {
            return Err(KernelError::InvalidParameter {
                reason: "revolution axis must lie in the profile plane".to_string(),
            });
        }

        let side = n.cross(&axis);
        let (lo, hi) = self
            .loops()
            .flatten()
            .flat_map(|c| c.sample(VALIDATION_SAMPLING))
            .map(|p| (p - axis_origin).dot(&side))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)));
        if lo < -CONNECT_TOLERANCE && hi > CONNECT_TOLERANCE {
            return Err(KernelError::ProfileCrossesAxis);
        }
        if lo.abs().max(hi.abs()) <= CONNECT_TOLERANCE {
            return Err(KernelError::DegenerateGeometry {
                reason: "profile lies on the revolution axis".to_string(),
            });
        }
        Ok(axis)
    }

    pub(crate) fn transformed(&self, t: &Transform) -> PlanarRegion {
        PlanarRegion {
            origin: t.transform_point(&self.origin),
            normal: t.transform_vector(&self.normal),
            x_dir: t.transform_vector(&self.x_dir),
            outer: self.outer.iter().map(|c| c.transformed(t)).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|c| c.transformed(t)).collect())
                .collect(),
        }
    }

    pub(crate) fn translated(&self, v: Vec3) -> PlanarRegion {
        PlanarRegion {
            origin: self.origin + v,
            normal: self.normal,
            x_dir: self.x_dir,
            outer: self.outer.iter().map(|c| c.translated(v)).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|c| c.translated(v)).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (f64, f64), b: (f64, f64)) -> Curve {
        Curve::Line {
            start: Point3d::new(a.0, a.1, 0.0),
            end: Point3d::new(b.0, b.1, 0.0),
        }
    }

    #[test]
    fn test_chain_reverses_backward_edges() {
        let chain = chain_curves(vec![
            line((0.0, 0.0), (1.0, 0.0)),
            line((1.0, 1.0), (1.0, 0.0)),
            line((1.0, 1.0), (0.0, 0.0)),
        ])
        .unwrap();
        assert!(is_closed_chain(&chain));
        assert_eq!(chain[1].start(), Point3d::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_chain_reports_gap_index() {
        let err = chain_curves(vec![line((0.0, 0.0), (1.0, 0.0)), line((5.0, 5.0), (6.0, 6.0))])
            .unwrap_err();
        assert!(matches!(err, KernelError::DisconnectedWire { index: 1 }));
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        let chain = chain_curves(vec![
            line((0.0, 0.0), (2.0, 2.0)),
            line((2.0, 2.0), (2.0, 0.0)),
            line((2.0, 0.0), (0.0, 1.0)),
            line((0.0, 1.0), (0.0, 0.0)),
        ])
        .unwrap();
        assert!(matches!(
            planar_region(chain, Vec::new()),
            Err(KernelError::SelfIntersectingProfile)
        ));
    }

    #[test]
    fn test_clockwise_outer_flips_normal() {
        let chain = chain_curves(vec![
            line((0.0, 0.0), (0.0, 1.0)),
            line((0.0, 1.0), (1.0, 1.0)),
            line((1.0, 1.0), (0.0, 0.0)),
        ])
        .unwrap();
        let region = planar_region(chain, Vec::new()).unwrap();
        assert!((region.normal - (-Vec3::Z)).length() < 1e-12);
    }
}
