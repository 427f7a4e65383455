//! Geometric edge predicates for blend passes.
//!
//! Selection looks only at each edge's own curve, so the chosen set does not
//! depend on the order the kernel lists edges in.

use part_geom::Axis;
use serde::{Deserialize, Serialize};
use shape_kernel::{EdgeCurve, EdgeId, KernelIntrospect, SolidHandle};
use tracing::debug;

/// Which side of a threshold a coordinate must fall on. The test is strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Above,
    Below,
}

impl Side {
    pub fn contains(self, value: f64, threshold: f64) -> bool {
        match self {
            Side::Above => value > threshold,
            Side::Below => value < threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeSelector {
    /// Circular edges whose center coordinate along `axis` lies strictly on
    /// `side` of `threshold`.
    CircleCenterBeyond {
        axis: Axis,
        threshold: f64,
        side: Side,
    },
    /// Straight edges parallel to `axis` whose distance from it equals
    /// `offset`. Both comparisons use `tolerance`.
    AxialLineAtOffset {
        axis: Axis,
        offset: f64,
        tolerance: f64,
    },
}

impl EdgeSelector {
    pub fn matches(&self, curve: &EdgeCurve) -> bool {
        match (self, curve) {
            (
                EdgeSelector::CircleCenterBeyond {
                    axis,
                    threshold,
                    side,
                },
                EdgeCurve::Circle { center, .. },
            ) => side.contains(axis.coordinate(center), *threshold),
            (
                EdgeSelector::AxialLineAtOffset {
                    axis,
                    offset,
                    tolerance,
                },
                EdgeCurve::Line { start, end },
            ) => {
                let (a0, b0) = axis.transverse(start);
                let (a1, b1) = axis.transverse(end);
                let parallel = (a0 - a1).abs() <= *tolerance && (b0 - b1).abs() <= *tolerance;
                parallel && (axis.radial_distance(start) - offset).abs() <= *tolerance
            }
            _ => false,
        }
    }
}

/// Edges of `solid` satisfying `selector`, in ascending id order.
pub fn select_edges(
    introspect: &dyn KernelIntrospect,
    solid: &SolidHandle,
    selector: &EdgeSelector,
) -> Vec<EdgeId> {
    let mut selected: Vec<EdgeId> = introspect
        .list_edges(solid)
        .into_iter()
        .filter(|e| {
            introspect
                .edge_curve(*e)
                .is_some_and(|curve| selector.matches(&curve))
        })
        .collect();
    selected.sort_unstable();
    debug!(?selector, count = selected.len(), "selected edges");
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use part_geom::{Point3d, Vec3};

    fn circle_at(x: f64) -> EdgeCurve {
        EdgeCurve::Circle {
            center: Point3d::new(x, 0.0, 0.0),
            axis: Vec3::X,
            radius: 5.0,
            start: Point3d::new(x, 5.0, 0.0),
            sweep: std::f64::consts::TAU,
        }
    }

    #[test]
    fn test_circle_threshold_is_strict() {
        let sel = EdgeSelector::CircleCenterBeyond {
            axis: Axis::X,
            threshold: 8.0,
            side: Side::Above,
        };
        assert!(sel.matches(&circle_at(8.5)));
        assert!(!sel.matches(&circle_at(8.0)));
        assert!(!sel.matches(&circle_at(3.0)));
        assert!(!sel.matches(&EdgeCurve::Line {
            start: Point3d::new(9.0, 0.0, 0.0),
            end: Point3d::new(10.0, 0.0, 0.0),
        }));
    }

    #[test]
    fn test_below_side() {
        let sel = EdgeSelector::CircleCenterBeyond {
            axis: Axis::X,
            threshold: -5.0,
            side: Side::Below,
        };
        assert!(sel.matches(&circle_at(-10.0)));
        assert!(!sel.matches(&circle_at(0.0)));
    }

    #[test]
    fn test_axial_line_needs_parallel_and_offset() {
        let sel = EdgeSelector::AxialLineAtOffset {
            axis: Axis::X,
            offset: 5.0,
            tolerance: 1e-3,
        };
        let along = EdgeCurve::Line {
            start: Point3d::new(0.0, 3.0, 4.0),
            end: Point3d::new(20.0, 3.0, 4.0),
        };
        let skew = EdgeCurve::Line {
            start: Point3d::new(0.0, 3.0, 4.0),
            end: Point3d::new(20.0, 3.5, 4.0),
        };
        let too_far = EdgeCurve::Line {
            start: Point3d::new(0.0, 3.0, 4.1),
            end: Point3d::new(20.0, 3.0, 4.1),
        };
        assert!(sel.matches(&along));
        assert!(!sel.matches(&skew));
        assert!(!sel.matches(&too_far));
    }
}
