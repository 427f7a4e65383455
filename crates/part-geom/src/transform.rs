use serde::{Deserialize, Serialize};

use crate::point::Point3d;
use crate::vector::Vec3;

/// A 4x4 affine transformation matrix stored in column-major order.
///
/// Composition follows matrix multiplication: `a.then(&b)` is `a * b`,
/// so `b` is applied to a point first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Column-major 4x4 matrix entries.
    pub m: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        Self::scaling(1.0, 1.0, 1.0)
    }

    pub fn translation(v: Vec3) -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            v.x, v.y, v.z, 1.0,
        ];
        Self { m }
    }

    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        #[rustfmt::skip]
        let m = [
            sx,  0.0, 0.0, 0.0,
            0.0, sy,  0.0, 0.0,
            0.0, 0.0, sz,  0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    /// Rotation by `angle` radians about an axis through the origin (Rodrigues).
    ///
    /// A zero-length axis yields the identity.
    pub fn rotation(axis: Vec3, angle: f64) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::identity();
        };
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        #[rustfmt::skip]
        let m = [
            t*x*x + c,     t*x*y + s*z,   t*x*z - s*y,   0.0,
            t*x*y - s*z,   t*y*y + c,     t*y*z + s*x,   0.0,
            t*x*z + s*y,   t*y*z - s*x,   t*z*z + c,     0.0,
            0.0,           0.0,           0.0,           1.0,
        ];
        Self { m }
    }

    /// Rotation by `angle` radians about the line through `origin` along `axis`.
    pub fn rotation_about(origin: Point3d, axis: Vec3, angle: f64) -> Self {
        let to_origin = Self::translation(-origin.to_vec3());
        let back = Self::translation(origin.to_vec3());
        back.then(&Self::rotation(axis, angle)).then(&to_origin)
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let v = self.transform_vector(&p.to_vec3());
        Point3d::new(v.x + self.at(0, 3), v.y + self.at(1, 3), v.z + self.at(2, 3))
    }

    /// Apply the linear part only.
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        Vec3::new(
            self.at(0, 0) * v.x + self.at(0, 1) * v.y + self.at(0, 2) * v.z,
            self.at(1, 0) * v.x + self.at(1, 1) * v.y + self.at(1, 2) * v.z,
            self.at(2, 0) * v.x + self.at(2, 1) * v.y + self.at(2, 2) * v.z,
        )
    }

    /// Matrix product `self * other`.
    pub fn then(&self, other: &Transform) -> Transform {
        let mut m = [0.0f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                m[col * 4 + row] = (0..4).map(|k| self.at(row, k) * other.at(k, col)).sum();
            }
        }
        Transform { m }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: Point3d, b: Point3d) {
        assert!(a.distance_to(&b) < 1e-12, "{a:?} != {b:?}");
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(Vec3::new(10.0, 20.0, 30.0));
        assert_close(t.transform_point(&Point3d::new(1.0, 2.0, 3.0)), Point3d::new(11.0, 22.0, 33.0));
        assert_eq!(t.transform_vector(&Vec3::X), Vec3::X);
    }

    #[test]
    fn test_rotation_about_x_quarter_turn() {
        let t = Transform::rotation(Vec3::X, FRAC_PI_2);
        assert_close(t.transform_point(&Point3d::new(0.0, 1.0, 0.0)), Point3d::new(0.0, 0.0, 1.0));
        assert_close(t.transform_point(&Point3d::new(5.0, 0.0, 0.0)), Point3d::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_about_offset_line() {
        let t = Transform::rotation_about(Point3d::new(1.0, 0.0, 0.0), Vec3::Z, PI);
        assert_close(t.transform_point(&Point3d::ORIGIN), Point3d::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        let rotate = Transform::rotation(Vec3::Z, FRAC_PI_2);
        let shift = Transform::translation(Vec3::X);
        let p = rotate.then(&shift).transform_point(&Point3d::ORIGIN);
        assert_close(p, Point3d::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_zero_axis_is_identity() {
        assert!(Transform::rotation(Vec3::ZERO, 1.0).is_identity());
    }
}
