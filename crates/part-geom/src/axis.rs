use serde::{Deserialize, Serialize};

use crate::point::Point3d;
use crate::vector::Vec3;

/// One of the three principal axes of the model coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Coordinate of `p` along this axis.
    pub fn coordinate(self, p: &Point3d) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }

    /// The two coordinates of `p` orthogonal to this axis, in cyclic order.
    pub fn transverse(self, p: &Point3d) -> (f64, f64) {
        match self {
            Axis::X => (p.y, p.z),
            Axis::Y => (p.z, p.x),
            Axis::Z => (p.x, p.y),
        }
    }

    /// Distance from `p` to the axis line through the origin.
    pub fn radial_distance(self, p: &Point3d) -> f64 {
        let (a, b) = self.transverse(p);
        a.hypot(b)
    }
}
