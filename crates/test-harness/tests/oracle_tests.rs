use mesh_extract::TriangleBuffer;
use part_geom::{BoundingBox, Point3d};
use test_harness::assertions::*;
use test_harness::oracle::*;

const UP: [f32; 3] = [0.0, 0.0, 1.0];

/// Two triangles covering [x, x+2] x [y, y+2] at height z.
fn square_at([x, y, z]: [f32; 3], second_normals: [[f32; 3]; 3]) -> TriangleBuffer {
    let mut mesh = TriangleBuffer::new();
    mesh.push_flat([[x, y, z], [x + 2.0, y, z], [x + 2.0, y + 2.0, z]], UP);
    mesh.push([[x, y, z], [x + 2.0, y + 2.0, z], [x, y + 2.0, z]], second_normals);
    mesh
}

fn square() -> TriangleBuffer {
    square_at([0.0; 3], [UP; 3])
}

#[test]
fn square_passes_every_mesh_oracle() {
    let verdicts = run_mesh_oracles(&square());
    assert_all_pass(&verdicts, "square").unwrap();
}

#[test]
fn empty_mesh_fails_non_empty() {
    let v = check_non_empty(&TriangleBuffer::new());
    assert!(!v.passed);
    assert_eq!(v.value, Some(0.0));
}

#[test]
fn reversed_normal_is_found() {
    let mesh = square_at([0.0; 3], [[0.0, 0.0, -1.0], UP, UP]);
    let v = check_normals_follow_winding(&mesh);
    assert!(!v.passed);
    assert!(v.detail.contains("[1]"));
}

#[test]
fn long_normal_fails_unit_check() {
    let mesh = square_at([0.0; 3], [[0.0, 0.0, 2.0], UP, UP]);
    assert!(!check_unit_normals(&mesh).passed);
}

#[test]
fn zero_normal_of_flat_triangle_is_allowed() {
    let mut mesh = square();
    mesh.push_flat([[1.0, 1.0, 1.0]; 3], [0.0; 3]);
    assert!(check_unit_normals(&mesh).passed);
    let degenerate = check_degenerate_fraction(&mesh, 0.1);
    assert!(!degenerate.passed);
    assert!(check_degenerate_fraction(&mesh, 0.5).passed);
}

#[test]
fn nan_is_not_finite() {
    let mesh = square_at([f32::NAN, 0.0, 0.0], [UP; 3]);
    assert!(!check_finite(&mesh).passed);
}

#[test]
fn bounding_box_and_area() {
    let expected = BoundingBox::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 2.0, 0.0));
    assert!(check_bounding_box(&square(), &expected, 1e-9).passed);
    let shifted = BoundingBox::new(Point3d::new(0.5, 0.0, 0.0), Point3d::new(2.0, 2.0, 0.0));
    assert!(!check_bounding_box(&square(), &shifted, 0.1).passed);

    assert!(check_surface_area(&square(), 4.0, 1e-9).passed);
    assert!(!check_surface_area(&square(), 5.0, 0.1).passed);
}

#[test]
fn assertion_messages_carry_context() {
    let err = assert_bounding_box(&square(), [0.0; 3], [3.0, 2.0, 0.0], 0.01, "square").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("[square]"));
    assert!(text.contains("max[0]"));
}

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn translated_square_passes(dx in -1000.0f32..1000.0, dy in -1000.0f32..1000.0, dz in -1000.0f32..1000.0) {
            let mesh = square_at([dx, dy, dz], [UP; 3]);
            let verdicts = run_mesh_oracles(&mesh);
            prop_assert!(verdicts.iter().all(|v| v.passed), "{:?}", verdicts);

            let expected = BoundingBox::new(
                Point3d::new(f64::from(dx), f64::from(dy), f64::from(dz)),
                Point3d::new(f64::from(dx) + 2.0, f64::from(dy) + 2.0, f64::from(dz)),
            );
            prop_assert!(check_bounding_box(&mesh, &expected, 1e-3).passed);
        }
    }
}
