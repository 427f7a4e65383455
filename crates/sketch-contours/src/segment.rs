use part_geom::Point2d;
use serde::{Deserialize, Serialize};

/// Straight sketch segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment2d {
    pub a: Point2d,
    pub b: Point2d,
}

impl Segment2d {
    pub const fn new(a: Point2d, b: Point2d) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        self.a.distance_to(&self.b)
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    /// The endpoint opposite the one within `tolerance` of `p`, if either is.
    pub fn far_end_from(&self, p: &Point2d, tolerance: f64) -> Option<Point2d> {
        if self.a.almost_equal(p, tolerance) {
            Some(self.b)
        } else if self.b.almost_equal(p, tolerance) {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A closed chain of at least three points. The closing point is not
/// repeated: the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourLoop {
    points: Vec<Point2d>,
    segments: Vec<usize>,
}

impl ContourLoop {
    pub(crate) fn new(points: Vec<Point2d>, segments: Vec<usize>) -> Self {
        Self { points, segments }
    }

    /// Points in chain order.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Input indices of the segments forming the loop, in chain order.
    pub fn segments(&self) -> &[usize] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area, positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let (p, q) = (self.points[i], self.points[(i + 1) % n]);
                p.x * q.y - q.x * p.y
            })
            .sum::<f64>()
            / 2.0
    }
}
