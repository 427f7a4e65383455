use std::f64::consts::TAU;

use approx::assert_abs_diff_eq;
use part_geom::{Point3d, Transform, Vec3};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -500.0..500.0f64
}

fn point() -> impl Strategy<Value = Point3d> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Point3d::new(x, y, z))
}

proptest! {
    #[test]
    fn rotation_preserves_distances(a in point(), b in point(), angle in -TAU..TAU) {
        let t = Transform::rotation(Vec3::new(1.0, 0.3, -0.2), angle);
        let before = a.distance_to(&b);
        let after = t.transform_point(&a).distance_to(&t.transform_point(&b));
        prop_assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn n_equal_steps_close_the_circle(p in point(), n in 1usize..12) {
        let step = Transform::rotation(Vec3::X, TAU / n as f64);
        let mut q = p;
        for _ in 0..n {
            q = step.transform_point(&q);
        }
        prop_assert!(p.distance_to(&q) < 1e-8);
    }

    #[test]
    fn rotation_about_axis_keeps_axial_coordinate(p in point(), angle in -TAU..TAU) {
        let t = Transform::rotation_about(Point3d::new(3.0, 0.0, 0.0), Vec3::X, angle);
        let q = t.transform_point(&p);
        prop_assert!((p.x - q.x).abs() < 1e-9);
    }
}

#[test]
fn rotation_composes_additively() {
    let a = Transform::rotation(Vec3::Z, 0.4);
    let b = Transform::rotation(Vec3::Z, 0.7);
    let combined = a.then(&b).transform_point(&Point3d::new(1.0, 0.0, 0.0));
    let direct = Transform::rotation(Vec3::Z, 1.1).transform_point(&Point3d::new(1.0, 0.0, 0.0));
    assert_abs_diff_eq!(combined.x, direct.x, epsilon = 1e-12);
    assert_abs_diff_eq!(combined.y, direct.y, epsilon = 1e-12);
}
