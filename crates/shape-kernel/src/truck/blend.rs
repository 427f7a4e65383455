//! Chamfers and fillets on truck solids.
//!
//! Each selected edge gets a tool solid: the blend cross-section in the
//! plane normal to the edge, swept along it. Convex edges subtract the
//! tool, concave edges add it. The two faces meeting at an edge are read
//! from a coarse triangulation of the solid.

use std::f64::consts::TAU;

use part_geom::{Point3d, Transform, Vec3};
use tracing::debug;
use truck_meshalgo::prelude::PolygonMesh;
use truck_modeling::topology::{Face, Solid};
use truck_modeling::{builder, Rad};

use super::introspect::{classify_points, EDGE_SAMPLES};
use super::{build, tessellation, Body, BOOLEAN_TOLERANCE};
use crate::curve::Curve;
use crate::region::{self, PlanarRegion};
use crate::types::*;

/// Spans closer than this, in radians, are merged.
const SPAN_GAP: f64 = 1e-6;

/// Normals closer than this (cosine) belong to the same face.
const SAME_NORMAL: f64 = 0.9998;

#[derive(Debug, Clone, Copy)]
pub(super) enum Blend {
    Chamfer(f64),
    Fillet(f64),
}

impl Blend {
    fn size(&self) -> f64 {
        match *self {
            Blend::Chamfer(d) | Blend::Fillet(d) => d,
        }
    }

    fn failed(&self, reason: impl Into<String>) -> KernelError {
        let reason = reason.into();
        match self {
            Blend::Chamfer(_) => KernelError::ChamferFailed { reason },
            Blend::Fillet(_) => KernelError::FilletFailed { reason },
        }
    }

    /// How far a tool runs past the ends of its edge. Tools that add
    /// material stop short so they never poke out of the end faces.
    fn overrun(&self, convex: bool) -> f64 {
        if convex {
            self.reach()
        } else {
            -0.1 * self.size()
        }
    }

    /// How far a cross-section reaches beyond the faces it cuts.
    fn reach(&self) -> f64 {
        (0.5 * self.size()).max(0.2)
    }
}

/// One face next to an edge: its outward normal and the direction leading
/// away from the edge inside the face, both perpendicular to the edge.
#[derive(Debug, Clone, Copy)]
struct Flank {
    normal: Vec3,
    inward: Vec3,
}

fn centroid(tri: &[Point3d; 3]) -> Point3d {
    let [a, b, c] = tri;
    let sum = a.to_vec3() + b.to_vec3() + c.to_vec3();
    Point3d::new(sum.x / 3.0, sum.y / 3.0, sum.z / 3.0)
}

/// Flank of a face mesh at `p`, read off the triangle nearest to it.
fn flank(p: Point3d, tangent: Vec3, mesh: &PolygonMesh) -> Option<(f64, Flank)> {
    let (distance, tri) = tessellation::mesh_triangles(mesh)
        .map(|tri| (centroid(&tri).distance_to(&p), tri))
        .min_by(|a, b| a.0.total_cmp(&b.0))?;
    let [a, b, c] = tri;
    let normal = (b - a).cross(&(c - a)).reject_from(&tangent).normalized()?;
    let inward = (centroid(&tri) - p)
        .reject_from(&tangent)
        .reject_from(&normal)
        .normalized()?;
    Some((distance, Flank { normal, inward }))
}

/// The two distinct faces meeting at `p`, nearest first.
fn flanks(
    p: Point3d,
    tangent: Vec3,
    faces: &[usize],
    meshes: &[Option<PolygonMesh>],
) -> Option<(Flank, Flank)> {
    let mut found: Vec<(f64, Flank)> = faces
        .iter()
        .filter_map(|&i| meshes.get(i)?.as_ref())
        .filter_map(|mesh| flank(p, tangent, mesh))
        .collect();
    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut rest = found.into_iter().map(|(_, f)| f);
    let first = rest.next()?;
    let second = rest.find(|f| f.normal.dot(&first.normal) < SAME_NORMAL)?;
    Some((first, second))
}

fn signed_angle(from: Vec3, to: Vec3, axis: &Vec3) -> f64 {
    from.cross(&to).dot(axis).atan2(from.dot(&to))
}

/// Blend cross-section at `p` in the plane normal to `tangent`, and
/// whether the edge is convex.
fn section(
    p: Point3d,
    tangent: Vec3,
    a: Flank,
    b: Flank,
    blend: Blend,
) -> Result<(PlanarRegion, bool), KernelError> {
    let convex = a.inward.dot(&b.normal) < 0.0;
    let opening = a.inward.angle_to(&b.inward);
    if !(0.02..=TAU / 2.0 - 0.02).contains(&opening) {
        return Err(blend.failed("faces meet tangentially"));
    }
    let bisector = (a.inward + b.inward)
        .normalized()
        .ok_or_else(|| blend.failed("faces meet tangentially"))?;
    let reach = blend.reach();

    let chain = match blend {
        Blend::Chamfer(d) => {
            let pa = p + a.inward * d;
            let pb = p + b.inward * d;
            let along = (pa - pb)
                .normalized()
                .ok_or_else(|| blend.failed("chamfer setbacks coincide"))?;
            let corners = [pa + along * reach, pb - along * reach, p - bisector * reach];
            (0..3)
                .map(|i| Curve::line(corners[i], corners[(i + 1) % 3]))
                .collect::<Result<Vec<_>, _>>()?
        }
        Blend::Fillet(r) => {
            // The center sits slightly inside the tangent position so the
            // arc crosses both faces instead of touching them.
            let center = p + bisector * (r / (opening / 2.0).sin() - 0.02 * r);
            let w = center - p;
            let crossing = |u: Vec3| {
                let uw = u.dot(&w);
                let disc = uw * uw - w.dot(&w) + r * r;
                (disc >= 0.0).then(|| p + u * (uw - disc.sqrt()))
            };
            let (xa, xb) = crossing(a.inward)
                .zip(crossing(b.inward))
                .ok_or_else(|| blend.failed("fillet arc misses a face"))?;
            let side = if convex { reach } else { -reach };
            let outside = (a.normal + b.normal)
                .normalized()
                .ok_or_else(|| blend.failed("faces meet tangentially"))?;
            let sweep = signed_angle(xa - center, xb - center, &tangent);
            let ya = xa + a.normal * side;
            let yb = xb + b.normal * side;
            let corner = p + outside * side;
            vec![
                Curve::arc(center, tangent, xa, sweep)?,
                Curve::line(xb, yb)?,
                Curve::line(yb, corner)?,
                Curve::line(corner, ya)?,
                Curve::line(ya, xa)?,
            ]
        }
    };
    let region = region::planar_region(chain, Vec::new()).map_err(|e| blend.failed(e.to_string()))?;
    Ok((region, convex))
}

struct Tool {
    solid: Solid,
    convex: bool,
}

fn swept_face(region: &PlanarRegion, blend: Blend) -> Result<Face, KernelError> {
    build::region_face(region).map_err(|e| blend.failed(e.to_string()))
}

fn line_tool(
    start: Point3d,
    end: Point3d,
    faces: &[usize],
    meshes: &[Option<PolygonMesh>],
    blend: Blend,
) -> Result<Tool, KernelError> {
    let length = start.distance_to(&end);
    let tangent = (end - start)
        .normalized()
        .ok_or_else(|| blend.failed("edge has zero length"))?;
    let mid = start.midpoint(&end);
    let (a, b) = flanks(mid, tangent, faces, meshes)
        .ok_or_else(|| blend.failed("edge does not join two faces"))?;
    let (region, convex) = section(mid, tangent, a, b, blend)?;

    let overrun = blend.overrun(convex);
    let span = length + 2.0 * overrun;
    if span <= 0.0 {
        return Err(blend.failed("edge is too short for the blend"));
    }
    let region = region.translated(tangent * -(length / 2.0 + overrun));
    let face = swept_face(&region, blend)?;
    let solid = build::outward(builder::tsweep(&face, build::vector(&(tangent * span))));
    Ok(Tool { solid, convex })
}

/// Selected circle edges sharing one circle.
struct Ring {
    center: Point3d,
    axis: Vec3,
    radius: f64,
    ref_dir: Vec3,
    /// `(start angle, positive span)` about `axis`, from `ref_dir`.
    spans: Vec<(f64, f64)>,
    faces: Vec<usize>,
}

impl Ring {
    fn point_at(&self, angle: f64) -> Point3d {
        let side = self.axis.cross(&self.ref_dir);
        self.center + (self.ref_dir * angle.cos() + side * angle.sin()) * self.radius
    }

    fn matches(&self, center: &Point3d, axis: &Vec3, radius: f64) -> bool {
        let tol = 1e-4 * (1.0 + self.radius);
        center.distance_to(&self.center) <= tol
            && (radius - self.radius).abs() <= tol
            && self.axis.dot(axis).abs() >= SAME_NORMAL
    }

    fn add(&mut self, axis: &Vec3, start: &Point3d, sweep: f64, faces: &[usize]) {
        let offset = *start - self.center;
        let mut from = signed_angle(self.ref_dir, offset, &self.axis);
        let mut span = sweep * self.axis.dot(axis).signum();
        if span < 0.0 {
            from += span;
            span = -span;
        }
        self.spans.push((from, span));
        for f in faces {
            if !self.faces.contains(f) {
                self.faces.push(*f);
            }
        }
    }

    /// Covered angular intervals, merged across the seam.
    fn merged_spans(&self) -> Vec<(f64, f64)> {
        let mut spans: Vec<(f64, f64)> = self
            .spans
            .iter()
            .map(|&(from, span)| (from.rem_euclid(TAU), span.min(TAU)))
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut out: Vec<(f64, f64)> = Vec::new();
        for (from, span) in spans {
            match out.last_mut() {
                Some(last) if from <= last.0 + last.1 + SPAN_GAP => {
                    last.1 = last.1.max(from + span - last.0);
                }
                _ => out.push((from, span)),
            }
        }
        if out.len() > 1 {
            let (last, first) = (out[out.len() - 1], out[0]);
            if last.0 + last.1 + SPAN_GAP >= first.0 + TAU {
                out.pop();
                out[0] = (last.0, last.1.max(first.0 + TAU + first.1 - last.0));
            }
        }
        if out.iter().any(|&(_, span)| span >= TAU - SPAN_GAP) {
            return vec![(0.0, TAU)];
        }
        out
    }

    fn tools(
        &self,
        meshes: &[Option<PolygonMesh>],
        blend: Blend,
    ) -> Result<Vec<Tool>, KernelError> {
        let origin = build::point(&self.center);
        let axis = build::vector(&self.axis);
        let mut tools = Vec::new();
        for (from, span) in self.merged_spans() {
            let at = from + span / 2.0;
            let p = self.point_at(at);
            let tangent = self
                .axis
                .cross(&(p - self.center))
                .normalized()
                .ok_or_else(|| blend.failed("circle edge has zero radius"))?;
            let (a, b) = flanks(p, tangent, &self.faces, meshes)
                .ok_or_else(|| blend.failed("edge does not join two faces"))?;
            let (region, convex) = section(p, tangent, a, b, blend)?;

            let turn = blend.overrun(convex) / self.radius;
            let solid = if span + 2.0 * turn >= TAU - SPAN_GAP {
                let face = swept_face(&region, blend)?;
                builder::rsweep(&face, origin, axis, Rad(TAU))
            } else if span + 2.0 * turn > 0.0 {
                let back = Transform::rotation_about(self.center, self.axis, from - turn - at);
                let face = swept_face(&region.transformed(&back), blend)?;
                builder::rsweep(&face, origin, axis, Rad(span + 2.0 * turn))
            } else {
                return Err(blend.failed("arc is too short for the blend"));
            };
            tools.push(Tool {
                solid: build::outward(solid),
                convex,
            });
        }
        Ok(tools)
    }
}

/// Blend the given edges of a single-solid body stored under `key`.
pub(super) fn apply(
    body: &Body,
    key: u64,
    edges: &[EdgeId],
    blend: Blend,
) -> Result<Solid, KernelError> {
    let [solid] = body.parts.as_slice() else {
        return Err(blend.failed("blends need a single solid"));
    };
    let faces: Vec<&Face> = body.faces().collect();
    let meshes = tessellation::face_meshes(solid, (0.25 * blend.size()).clamp(0.01, 0.1));

    let mut tools = Vec::new();
    let mut rings: Vec<Ring> = Vec::new();
    for &id in edges {
        let edge = body.edge(key, id).ok_or(KernelError::EdgeNotFound { id })?;
        let adjacent: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, face)| {
                face.boundaries()
                    .iter()
                    .flat_map(|wire| wire.edge_iter())
                    .any(|e| e.id() == edge.id())
            })
            .map(|(i, _)| i)
            .collect();

        match classify_points(&tessellation::sample_edge(&edge, EDGE_SAMPLES)) {
            EdgeCurve::Line { start, end } => {
                tools.push(line_tool(start, end, &adjacent, &meshes, blend)?);
            }
            EdgeCurve::Circle {
                center,
                axis,
                radius,
                start,
                sweep,
            } => {
                let ring = match rings.iter().position(|r| r.matches(&center, &axis, radius)) {
                    Some(i) => &mut rings[i],
                    None => {
                        let ref_dir = (start - center)
                            .normalized()
                            .ok_or_else(|| blend.failed("circle edge has zero radius"))?;
                        rings.push(Ring {
                            center,
                            axis,
                            radius,
                            ref_dir,
                            spans: Vec::new(),
                            faces: Vec::new(),
                        });
                        let last = rings.len() - 1;
                        &mut rings[last]
                    }
                };
                ring.add(&axis, &start, sweep, &adjacent);
            }
            EdgeCurve::Other => {
                return Err(blend.failed(format!("edge {id:?} is neither a line nor a circle")));
            }
        }
    }
    for ring in &rings {
        tools.extend(ring.tools(&meshes, blend)?);
    }

    let count = tools.len();
    let mut result = solid.clone();
    for Tool { solid: mut tool, convex } in tools {
        let next = if convex {
            tool.not();
            truck_shapeops::and(&result, &tool, BOOLEAN_TOLERANCE)
        } else {
            truck_shapeops::or(&result, &tool, BOOLEAN_TOLERANCE)
        };
        result = next.ok_or_else(|| blend.failed("boolean with the blend tool failed"))?;
    }
    debug!(tools = count, "applied blend");
    Ok(result)
}
