//! Analytic edge geometry for free edges, wires and reference solids.

use std::f64::consts::{FRAC_PI_4, TAU};

use part_geom::{BoundingBox, Point3d, Transform, Vec3};

use crate::region::CONNECT_TOLERANCE;
use crate::types::{EdgeCurve, KernelError};

/// Upper bound on samples per curve, whatever the tolerance.
const MAX_SEGMENTS: usize = 512;

/// A bounded curve. Parameter `t` runs over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Curve {
    Line {
        start: Point3d,
        end: Point3d,
    },
    /// Points are `center + radius * (cos a * ref_dir + sin a * (axis x ref_dir))`
    /// for `a` in `[0, sweep]`. `axis` and `ref_dir` are orthonormal.
    Arc {
        center: Point3d,
        axis: Vec3,
        ref_dir: Vec3,
        radius: f64,
        sweep: f64,
    },
}

impl Curve {
    /// Straight segment between two distinct finite points.
    pub(crate) fn line(start: Point3d, end: Point3d) -> Result<Curve, KernelError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(KernelError::InvalidParameter {
                reason: "line endpoint is not finite".to_string(),
            });
        }
        if start.distance_to(&end) <= CONNECT_TOLERANCE {
            return Err(KernelError::DegenerateGeometry {
                reason: "line edge has zero length".to_string(),
            });
        }
        Ok(Curve::Line { start, end })
    }

    /// Arc from `start` swept by `sweep` radians about `axis` through `center`.
    /// The center is moved along the axis into the plane of `start`.
    pub(crate) fn arc(center: Point3d, axis: Vec3, start: Point3d, sweep: f64) -> Result<Curve, KernelError> {
        let axis = axis.normalized().ok_or_else(|| KernelError::InvalidParameter {
            reason: "arc axis has zero length".to_string(),
        })?;
        let offset = (start - center).reject_from(&axis);
        let radius = offset.length();
        let ref_dir = offset.normalized().ok_or_else(|| KernelError::DegenerateGeometry {
            reason: "arc start lies on its axis".to_string(),
        })?;
        if !sweep.is_finite() || sweep == 0.0 || sweep.abs() > TAU + 1e-12 {
            return Err(KernelError::InvalidParameter {
                reason: format!("arc sweep {sweep} out of range"),
            });
        }
        Ok(Curve::Arc {
            center: center + axis * (start - center).dot(&axis),
            axis,
            ref_dir,
            radius,
            sweep: sweep.clamp(-TAU, TAU),
        })
    }

    pub(crate) fn start(&self) -> Point3d {
        self.point_at(0.0)
    }

    pub(crate) fn end(&self) -> Point3d {
        self.point_at(1.0)
    }

    pub(crate) fn point_at(&self, t: f64) -> Point3d {
        match self {
            Curve::Line { start, end } => start.lerp(end, t),
            Curve::Arc {
                center,
                axis,
                ref_dir,
                radius,
                sweep,
            } => {
                let (s, c) = (sweep * t).sin_cos();
                let binormal = axis.cross(ref_dir);
                *center + (*ref_dir * c + binormal * s) * *radius
            }
        }
    }

    /// Unit direction of travel at `t`.
    pub(crate) fn tangent_at(&self, t: f64) -> Vec3 {
        match self {
            Curve::Line { start, end } => (*end - *start).normalized().unwrap_or(Vec3::ZERO),
            Curve::Arc {
                axis,
                ref_dir,
                sweep,
                ..
            } => {
                let (s, c) = (sweep * t).sin_cos();
                let binormal = axis.cross(ref_dir);
                (binormal * c - *ref_dir * s) * sweep.signum()
            }
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(self, Curve::Arc { sweep, .. } if (sweep.abs() - TAU).abs() < 1e-9)
    }

    pub(crate) fn reversed(&self) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: *end,
                end: *start,
            },
            Curve::Arc {
                center,
                axis,
                radius,
                sweep,
                ..
            } => {
                let new_ref = (self.end() - *center)
                    .normalized()
                    .unwrap_or(Vec3::X);
                Curve::Arc {
                    center: *center,
                    axis: *axis,
                    ref_dir: new_ref,
                    radius: *radius,
                    sweep: -sweep,
                }
            }
        }
    }

    pub(crate) fn transformed(&self, t: &Transform) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: t.transform_point(start),
                end: t.transform_point(end),
            },
            Curve::Arc {
                center,
                axis,
                ref_dir,
                radius,
                sweep,
            } => Curve::Arc {
                center: t.transform_point(center),
                axis: t.transform_vector(axis),
                ref_dir: t.transform_vector(ref_dir),
                radius: *radius,
                sweep: *sweep,
            },
        }
    }

    pub(crate) fn translated(&self, v: Vec3) -> Curve {
        self.transformed(&Transform::translation(v))
    }

    /// Number of chords needed to stay within `tolerance` of the curve.
    pub(crate) fn segment_count(&self, tolerance: f64) -> usize {
        match self {
            Curve::Line { .. } => 1,
            Curve::Arc { radius, sweep, .. } => {
                let step = if tolerance >= *radius {
                    std::f64::consts::FRAC_PI_2
                } else {
                    2.0 * (1.0 - tolerance / radius).acos()
                };
                let by_tolerance = (sweep.abs() / step.max(1e-6)).ceil() as usize;
                let minimum = (sweep.abs() / FRAC_PI_4).ceil() as usize;
                by_tolerance.max(minimum).clamp(1, MAX_SEGMENTS)
            }
        }
    }

    /// `n + 1` points at equal parameter steps, both ends included.
    pub(crate) fn sample_n(&self, n: usize) -> Vec<Point3d> {
        let n = n.max(1);
        (0..=n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }

    pub(crate) fn sample(&self, tolerance: f64) -> Vec<Point3d> {
        self.sample_n(self.segment_count(tolerance))
    }

    pub(crate) fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.sample_n(self.segment_count(1e-3)))
    }

    pub(crate) fn to_edge_curve(&self) -> EdgeCurve {
        match self {
            Curve::Line { start, end } => EdgeCurve::Line {
                start: *start,
                end: *end,
            },
            Curve::Arc {
                center,
                axis,
                radius,
                sweep,
                ..
            } => EdgeCurve::Circle {
                center: *center,
                axis: *axis,
                radius: *radius,
                start: self.start(),
                sweep: *sweep,
            },
        }
    }

    /// Radial unit vector of an arc at parameter `t`.
    pub(crate) fn radial_at(&self, t: f64) -> Option<Vec3> {
        match self {
            Curve::Arc { center, .. } => (self.point_at(t) - *center).normalized(),
            Curve::Line { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn quarter_arc() -> Curve {
        Curve::Arc {
            center: Point3d::ORIGIN,
            axis: Vec3::Z,
            ref_dir: Vec3::X,
            radius: 2.0,
            sweep: FRAC_PI_2,
        }
    }

    #[test]
    fn test_arc_endpoints() {
        let arc = quarter_arc();
        assert!(arc.start().distance_to(&Point3d::new(2.0, 0.0, 0.0)) < 1e-12);
        assert!(arc.end().distance_to(&Point3d::new(0.0, 2.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_reversed_arc_swaps_ends() {
        let arc = quarter_arc();
        let rev = arc.reversed();
        assert!(rev.start().distance_to(&arc.end()) < 1e-12);
        assert!(rev.end().distance_to(&arc.start()) < 1e-12);
        assert!(rev.point_at(0.5).distance_to(&arc.point_at(0.5)) < 1e-12);
    }

    #[test]
    fn test_tangent_follows_sweep_sign() {
        let arc = quarter_arc();
        assert!((arc.tangent_at(0.0) - Vec3::Y).length() < 1e-12);
        let rev = arc.reversed();
        assert!((rev.tangent_at(1.0) - (-Vec3::Y)).length() < 1e-12);
    }

    #[test]
    fn test_segment_count_grows_with_precision() {
        let circle = Curve::Arc {
            center: Point3d::ORIGIN,
            axis: Vec3::Z,
            ref_dir: Vec3::X,
            radius: 10.0,
            sweep: 2.0 * PI,
        };
        assert!(circle.is_closed());
        let coarse = circle.segment_count(1.0);
        let fine = circle.segment_count(0.01);
        assert!(coarse >= 8);
        assert!(fine > coarse);
    }
}
