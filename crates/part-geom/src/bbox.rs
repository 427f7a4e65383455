use serde::{Deserialize, Serialize};

use crate::point::Point3d;
use crate::vector::Vec3;

/// Axis-aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3d>) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.include(p);
        }
        bb
    }

    pub fn include(&mut self, p: &Point3d) {
        self.min = Point3d::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3d::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.include(&other.min);
        out.include(&other.max);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Overlap of two boxes; empty when they do not intersect.
    pub fn intersection(&self, other: &Self) -> Self {
        let out = Self {
            min: Point3d::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3d::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        };
        if out.is_empty() {
            Self::empty()
        } else {
            out
        }
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn expanded(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        let m = Vec3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bb = BoundingBox::from_points(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 2.0, 3.0),
            Point3d::new(-1.0, 0.5, 1.0),
        ]);
        assert_eq!(bb.min, Point3d::new(-1.0, 0.0, 0.0));
        assert_eq!(bb.size(), Vec3::new(2.0, 2.0, 3.0));
    }

    #[test]
    fn test_empty_box_never_intersects() {
        let empty = BoundingBox::empty();
        let unit = BoundingBox::new(Point3d::ORIGIN, Point3d::new(1.0, 1.0, 1.0));
        assert!(empty.is_empty());
        assert!(!empty.intersects(&unit));
        assert_eq!(empty.size(), Vec3::ZERO);
    }

    #[test]
    fn test_intersection() {
        let a = BoundingBox::new(Point3d::ORIGIN, Point3d::new(2.0, 2.0, 2.0));
        let b = BoundingBox::new(Point3d::new(1.0, 1.0, 1.0), Point3d::new(3.0, 3.0, 3.0));
        let c = BoundingBox::new(Point3d::new(5.0, 5.0, 5.0), Point3d::new(6.0, 6.0, 6.0));
        assert_eq!(a.intersection(&b).size(), Vec3::new(1.0, 1.0, 1.0));
        assert!(a.intersection(&c).is_empty());
    }
}
