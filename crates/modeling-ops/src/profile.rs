//! 2D profiles in sketch coordinates and their placement in model space.

use std::f64::consts::TAU;

use part_geom::{Point2d, Point3d, Vec3};
use serde::{Deserialize, Serialize};
use shape_kernel::{EdgeHandle, FaceHandle, WireHandle};

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Sweep below which an arc is taken to close on itself.
const FULL_TURN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfileSegment {
    Line {
        to: Point2d,
    },
    /// Circular arc about `center` ending at `to`. Ending where it starts
    /// makes a full circle.
    Arc {
        to: Point2d,
        center: Point2d,
        direction: ArcDirection,
    },
}

impl ProfileSegment {
    pub fn end(&self) -> Point2d {
        match self {
            ProfileSegment::Line { to } | ProfileSegment::Arc { to, .. } => *to,
        }
    }
}

/// Ordered chain of lines and arcs starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile2d {
    pub start: Point2d,
    pub segments: Vec<ProfileSegment>,
}

impl Profile2d {
    pub fn new(start: Point2d) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Closed polygon through `points`. Consecutive points closer than
    /// `tolerance` are merged, so a trapezoid whose two top corners meet
    /// becomes a triangle.
    pub fn polygon(points: &[Point2d], tolerance: f64) -> Result<Self, OpError> {
        let mut distinct: Vec<Point2d> = Vec::with_capacity(points.len());
        for p in points {
            if distinct.last().map_or(true, |q| !q.almost_equal(p, tolerance)) {
                distinct.push(*p);
            }
        }
        while distinct.len() > 1 && distinct[0].almost_equal(&distinct[distinct.len() - 1], tolerance) {
            distinct.pop();
        }
        if distinct.len() < 3 {
            return Err(OpError::DegenerateProfile {
                points: distinct.len(),
            });
        }
        let mut profile = Profile2d::new(distinct[0]);
        for p in &distinct[1..] {
            profile = profile.line_to(*p);
        }
        Ok(profile.close())
    }

    /// Full circle, as a single arc segment.
    pub fn circle(center: Point2d, radius: f64) -> Self {
        let start = Point2d::new(center.x + radius, center.y);
        Profile2d::new(start).arc_to(start, center, ArcDirection::CounterClockwise)
    }

    pub fn line_to(mut self, to: Point2d) -> Self {
        self.segments.push(ProfileSegment::Line { to });
        self
    }

    pub fn arc_to(mut self, to: Point2d, center: Point2d, direction: ArcDirection) -> Self {
        self.segments.push(ProfileSegment::Arc {
            to,
            center,
            direction,
        });
        self
    }

    /// Append a line back to the start unless the chain already ends there.
    pub fn close(self) -> Self {
        let start = self.start;
        if self.end() == start {
            self
        } else {
            self.line_to(start)
        }
    }

    pub fn end(&self) -> Point2d {
        self.segments.last().map_or(self.start, ProfileSegment::end)
    }

    pub fn is_closed(&self, tolerance: f64) -> bool {
        !self.segments.is_empty() && self.end().almost_equal(&self.start, tolerance)
    }

    /// Start point followed by every segment end point.
    pub fn vertices(&self) -> Vec<Point2d> {
        std::iter::once(self.start)
            .chain(self.segments.iter().map(ProfileSegment::end))
            .collect()
    }
}

/// Signed sweep from `from` to `to` about `center`.
fn arc_sweep(from: Point2d, to: Point2d, center: Point2d, direction: ArcDirection) -> f64 {
    let a0 = (from.y - center.y).atan2(from.x - center.x);
    let a1 = (to.y - center.y).atan2(to.x - center.x);
    let mut ccw = (a1 - a0).rem_euclid(TAU);
    if ccw < FULL_TURN_EPSILON {
        ccw = TAU;
    }
    match direction {
        ArcDirection::CounterClockwise => ccw,
        ArcDirection::Clockwise if ccw == TAU => -TAU,
        ArcDirection::Clockwise => ccw - TAU,
    }
}

/// A sketch plane: origin plus an orthonormal pair of in-plane directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    pub origin: Point3d,
    pub x_dir: Vec3,
    pub y_dir: Vec3,
}

impl SketchPlane {
    /// Sketch x along model X, sketch y along model Y.
    pub fn xy() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            x_dir: Vec3::X,
            y_dir: Vec3::Y,
        }
    }

    /// Plane through the origin normal to +X: sketch x along +Z, sketch y
    /// along -Y.
    pub fn yz() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            x_dir: Vec3::Z,
            y_dir: -Vec3::Y,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.x_dir.cross(&self.y_dir)
    }

    /// The same plane spun counter-clockwise about its normal.
    pub fn rotated(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            origin: self.origin,
            x_dir: self.x_dir * c + self.y_dir * s,
            y_dir: self.y_dir * c - self.x_dir * s,
        }
    }

    pub fn with_origin(&self, origin: Point3d) -> Self {
        Self { origin, ..*self }
    }

    pub fn to_world(&self, p: Point2d) -> Point3d {
        self.origin + self.x_dir * p.x + self.y_dir * p.y
    }
}

/// Build the edges of `profile` on `plane` and chain them into a wire.
pub fn build_wire(
    kb: &mut dyn KernelBundle,
    profile: &Profile2d,
    plane: &SketchPlane,
) -> Result<WireHandle, OpError> {
    if profile.segments.is_empty() {
        return Err(OpError::DegenerateProfile { points: 1 });
    }
    let normal = plane.normal();
    let mut edges: Vec<EdgeHandle> = Vec::with_capacity(profile.segments.len());
    let mut from = profile.start;
    for segment in &profile.segments {
        let edge = match segment {
            ProfileSegment::Line { to } => {
                kb.make_line_edge(plane.to_world(from), plane.to_world(*to))?
            }
            ProfileSegment::Arc {
                to,
                center,
                direction,
            } => {
                let sweep = arc_sweep(from, *to, *center, *direction);
                kb.make_arc_edge(plane.to_world(*center), normal, plane.to_world(from), sweep)?
            }
        };
        edges.push(edge);
        from = segment.end();
    }
    Ok(kb.make_wire(edges)?)
}

/// Planar face bounded by `outer`, with `holes` cut out of it.
pub fn build_face(
    kb: &mut dyn KernelBundle,
    outer: &Profile2d,
    holes: &[Profile2d],
    plane: &SketchPlane,
) -> Result<FaceHandle, OpError> {
    let outer = build_wire(kb, outer, plane)?;
    let holes = holes
        .iter()
        .map(|h| build_wire(kb, h, plane))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(kb.make_face(outer, holes)?)
}
