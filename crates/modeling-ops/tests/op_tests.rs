use std::f64::consts::FRAC_PI_4;

use modeling_ops::*;
use part_geom::{Axis, Point2d, Point3d, Vec3};
use shape_kernel::{CurveKind, KernelCall, KernelIntrospect, RecordingKernel, ReferenceKernel};

fn p(x: f64, y: f64) -> Point2d {
    Point2d::new(x, y)
}

/// Stepped shaft section in the XY plane, revolved about X.
fn stepped_profile() -> Profile2d {
    Profile2d::polygon(
        &[p(0.0, 5.0), p(30.0, 5.0), p(30.0, 10.0), p(8.0, 10.0), p(8.0, 20.0), p(0.0, 20.0)],
        1e-9,
    )
    .unwrap()
}

fn revolved(kernel: &mut dyn KernelBundle) -> shape_kernel::SolidHandle {
    execute_revolve(kernel, &stepped_profile(), &SketchPlane::xy(), Point3d::ORIGIN, Vec3::X).unwrap()
}

// ── Construction ───────────────────────────────────────────────────────────

#[test]
fn revolve_produces_one_circle_per_profile_corner() {
    let mut kernel = ReferenceKernel::new();
    let solid = revolved(&mut kernel);
    let edges = kernel.list_edges(&solid);
    assert_eq!(edges.len(), 6);
    assert!(edges
        .iter()
        .all(|e| kernel.edge_curve_type(*e) == Some(CurveKind::Circle)));
    assert_eq!(kernel.list_faces(&solid).len(), 6);
}

#[test]
fn extrude_with_circular_hole() {
    let mut kernel = ReferenceKernel::new();
    let outer = Profile2d::polygon(&[p(-10.0, -10.0), p(10.0, -10.0), p(10.0, 10.0), p(-10.0, 10.0)], 1e-9)
        .unwrap();
    let hole = Profile2d::circle(Point2d::ORIGIN, 4.0);
    let solid = execute_extrude(&mut kernel, &outer, &[hole], &SketchPlane::xy(), Vec3::new(0.0, 0.0, 6.0))
        .unwrap();
    let circles = kernel
        .list_edges(&solid)
        .into_iter()
        .filter(|e| kernel.edge_curve_type(*e) == Some(CurveKind::Circle))
        .count();
    assert_eq!(circles, 2);
}

#[test]
fn extrude_rejects_zero_vector() {
    let mut kernel = ReferenceKernel::new();
    let outer = Profile2d::circle(Point2d::ORIGIN, 1.0);
    let result = execute_extrude(&mut kernel, &outer, &[], &SketchPlane::xy(), Vec3::ZERO);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}

#[test]
fn self_intersecting_profile_surfaces_kernel_error() {
    let mut kernel = ReferenceKernel::new();
    let bowtie = Profile2d::polygon(&[p(0.0, 0.0), p(2.0, 2.0), p(2.0, 0.0), p(0.0, 1.0)], 1e-9).unwrap();
    let result = execute_extrude(&mut kernel, &bowtie, &[], &SketchPlane::xy(), Vec3::Z);
    assert!(matches!(
        result,
        Err(OpError::Kernel(shape_kernel::KernelError::SelfIntersectingProfile))
    ));
}

#[test]
fn rotated_plane_cutter_keeps_axial_extrusion() {
    let mut kernel = ReferenceKernel::new();
    let plane = SketchPlane::yz().rotated(FRAC_PI_4);
    let outer = Profile2d::polygon(&[p(-1.0, 6.0), p(1.0, 6.0), p(1.0, 8.0), p(-1.0, 8.0)], 1e-9).unwrap();
    let cutter = execute_extrude(&mut kernel, &outer, &[], &plane, Vec3::new(30.0, 0.0, 0.0)).unwrap();
    let axial = kernel
        .list_edges(&cutter)
        .into_iter()
        .filter_map(|e| kernel.line_endpoints(e))
        .filter(|(a, b)| (b.x - a.x).abs() > 29.0)
        .count();
    assert_eq!(axial, 4);
}

// ── Blends ─────────────────────────────────────────────────────────────────

#[test]
fn chamfer_with_empty_selection_returns_solid_without_kernel_call() {
    let mut kernel = RecordingKernel::new(ReferenceKernel::new());
    let outer = Profile2d::circle(Point2d::ORIGIN, 3.0);
    let solid = execute_extrude(&mut kernel, &outer, &[], &SketchPlane::xy(), Vec3::Z).unwrap();
    let faces = kernel.list_faces(&solid);
    kernel.clear();

    let solid = execute_chamfer(&mut kernel, solid, &[], 0.5).unwrap();
    let solid = execute_fillet(&mut kernel, solid, &[], 0.5).unwrap();
    assert!(kernel.calls().is_empty());
    assert_eq!(kernel.list_faces(&solid), faces);
}

#[test]
fn chamfer_rejects_negative_distance() {
    let mut kernel = ReferenceKernel::new();
    let solid = revolved(&mut kernel);
    let result = execute_chamfer(&mut kernel, solid, &[], -1.0);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}

#[test]
fn chamfer_selected_circles_beyond_flange() {
    let mut kernel = ReferenceKernel::new();
    let solid = revolved(&mut kernel);
    let selector = EdgeSelector::CircleCenterBeyond {
        axis: Axis::X,
        threshold: 8.0,
        side: Side::Above,
    };
    let edges = select_edges(&kernel, &solid, &selector);
    // Corners at x = 30 only; the step at x = 8 is not strictly beyond.
    assert_eq!(edges.len(), 2);
    let before = kernel.list_edges(&solid).len();
    let solid = execute_chamfer(&mut kernel, solid, &edges, 0.5).unwrap();
    assert_eq!(kernel.list_edges(&solid).len(), before + edges.len());
}

#[test]
fn selection_is_stable_across_runs() {
    let mut kernel = ReferenceKernel::new();
    let solid = revolved(&mut kernel);
    let selector = EdgeSelector::CircleCenterBeyond {
        axis: Axis::X,
        threshold: 4.0,
        side: Side::Below,
    };
    let first = select_edges(&kernel, &solid, &selector);
    let second = select_edges(&kernel, &solid, &selector);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn fillet_axial_lines_at_offset() {
    let mut kernel = ReferenceKernel::new();
    // Square bar along X, corners at distance sqrt(2) * 2 from the axis.
    let outer = Profile2d::polygon(&[p(-2.0, -2.0), p(2.0, -2.0), p(2.0, 2.0), p(-2.0, 2.0)], 1e-9).unwrap();
    let bar = execute_extrude(&mut kernel, &outer, &[], &SketchPlane::yz(), Vec3::new(10.0, 0.0, 0.0))
        .unwrap();
    let selector = EdgeSelector::AxialLineAtOffset {
        axis: Axis::X,
        offset: 8.0f64.sqrt(),
        tolerance: 1e-6,
    };
    let edges = select_edges(&kernel, &bar, &selector);
    assert_eq!(edges.len(), 4);
    let bar = execute_fillet(&mut kernel, bar, &edges, 0.5).unwrap();
    assert!(select_edges(&kernel, &bar, &selector).is_empty());
    assert_eq!(kernel.list_faces(&bar).len(), 10);
}

// ── Booleans and patterns ──────────────────────────────────────────────────

#[test]
fn subtract_consumes_both_operands() {
    let mut kernel = ReferenceKernel::new();
    let base = revolved(&mut kernel);
    let cutter = execute_extrude(
        &mut kernel,
        &Profile2d::circle(Point2d::ORIGIN, 2.0),
        &[],
        &SketchPlane::yz(),
        Vec3::new(30.0, 0.0, 0.0),
    )
    .unwrap();
    let result = execute_boolean(&mut kernel, base, cutter, BooleanKind::Subtract).unwrap();
    assert_eq!(kernel.solid_count(), 1);
    assert!(!kernel.list_faces(&result).is_empty());
}

#[test]
fn radial_pattern_unions_every_instance() {
    for count in [2usize, 3] {
        let mut kernel = RecordingKernel::new(ReferenceKernel::new());
        let base = revolved(&mut kernel);
        let lug = |k: &mut RecordingKernel<ReferenceKernel>, y: f64| {
            let sq = Profile2d::polygon(&[p(-1.0, y), p(1.0, y), p(1.0, y + 2.0), p(-1.0, y + 2.0)], 1e-9)
                .unwrap();
            execute_extrude(k, &sq, &[], &SketchPlane::yz(), Vec3::new(-4.0, 0.0, 0.0)).unwrap()
        };
        let mount = lug(&mut kernel, 12.0);
        let tooth = lug(&mut kernel, 16.0);
        kernel.clear();

        let result = execute_radial_pattern(
            &mut kernel,
            base,
            vec![mount, tooth],
            Point3d::ORIGIN,
            Vec3::X,
            count,
        )
        .unwrap();
        assert_eq!(kernel.union_count(), 2 * count);
        assert_eq!(
            kernel.count(|c| matches!(c, KernelCall::Duplicate)),
            2 * (count - 1)
        );
        assert_eq!(kernel.inner().solid_count(), 1);
        assert!(!kernel.list_faces(&result).is_empty());
    }
}

#[test]
fn pattern_transforms_are_equal_steps() {
    let rotations = pattern_transforms(Point3d::ORIGIN, Vec3::X, 4);
    assert_eq!(rotations.len(), 4);
    assert!(rotations[0].is_identity());
    let q = rotations[1].transform_point(&Point3d::new(0.0, 1.0, 0.0));
    assert!((q.z - 1.0).abs() < 1e-12 && q.y.abs() < 1e-12);
}

#[test]
fn radial_pattern_rejects_zero_count() {
    let mut kernel = ReferenceKernel::new();
    let base = revolved(&mut kernel);
    let result = execute_radial_pattern(&mut kernel, base, Vec::new(), Point3d::ORIGIN, Vec3::X, 0);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}
