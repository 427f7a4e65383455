use approx::assert_relative_eq;
use mesh_extract::{extract, MeshError, TriangleBuffer, DEFAULT_TOLERANCE};
use part_geom::{Point3d, Transform, Vec3};
use shape_kernel::*;

fn block(k: &mut ReferenceKernel, sx: f64, sy: f64, sz: f64) -> SolidHandle {
    let c = [(0.0, 0.0), (sx, 0.0), (sx, sy), (0.0, sy)];
    let edges = (0..4)
        .map(|i| {
            let (a, b) = (c[i], c[(i + 1) % 4]);
            k.make_line_edge(Point3d::new(a.0, a.1, 0.0), Point3d::new(b.0, b.1, 0.0))
                .unwrap()
        })
        .collect();
    let wire = k.make_wire(edges).unwrap();
    let face = k.make_face(wire, vec![]).unwrap();
    k.extrude(face, Vec3::new(0.0, 0.0, sz)).unwrap()
}

fn assert_well_formed(buf: &TriangleBuffer) {
    assert_eq!(buf.normals().len(), 3 * buf.triangle_count());
    for n in buf.normals() {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!(len == 0.0 || (len - 1.0).abs() < 1e-5, "normal length {len}");
    }
}

#[test]
fn block_surface_is_fully_covered() {
    let mut k = ReferenceKernel::new();
    let solid = block(&mut k, 2.0, 3.0, 4.0);
    let buf = extract(&mut k, &solid, DEFAULT_TOLERANCE).unwrap();
    assert!(!buf.is_empty());
    assert_well_formed(&buf);
    assert_relative_eq!(buf.surface_area(), 52.0, epsilon = 1e-3);

    let bb = buf.bounding_box();
    assert_relative_eq!(bb.max.x, 2.0, epsilon = 1e-6);
    assert_relative_eq!(bb.max.z, 4.0, epsilon = 1e-6);
}

#[test]
fn face_location_moves_nodes() {
    let mut k = ReferenceKernel::new();
    let solid = block(&mut k, 1.0, 1.0, 1.0);
    let moved = k
        .transformed(solid, &Transform::translation(Vec3::new(10.0, 0.0, 0.0)))
        .unwrap();
    let buf = extract(&mut k, &moved, DEFAULT_TOLERANCE).unwrap();
    let bb = buf.bounding_box();
    assert_relative_eq!(bb.min.x, 10.0, epsilon = 1e-5);
    assert_relative_eq!(bb.max.x, 11.0, epsilon = 1e-5);
}

#[test]
fn extraction_is_repeatable() {
    let mut k = ReferenceKernel::new();
    let solid = block(&mut k, 2.0, 1.0, 1.0);
    let first = extract(&mut k, &solid, 0.1).unwrap();
    let second = extract(&mut k, &solid, 0.1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cylinder_normals_are_flat_per_triangle() {
    let mut k = ReferenceKernel::new();
    let circle = k
        .make_arc_edge(Point3d::ORIGIN, Vec3::Z, Point3d::new(5.0, 0.0, 0.0), std::f64::consts::TAU)
        .unwrap();
    let wire = k.make_wire(vec![circle]).unwrap();
    let face = k.make_face(wire, vec![]).unwrap();
    let solid = k.extrude(face, Vec3::new(0.0, 0.0, 2.0)).unwrap();

    let coarse = extract(&mut k, &solid, 0.5).unwrap();
    let fine = extract(&mut k, &solid, 0.01).unwrap();
    assert_well_formed(&fine);
    assert!(fine.triangle_count() > coarse.triangle_count());
    for chunk in fine.normals().chunks(3) {
        assert_eq!(chunk[0], chunk[1]);
        assert_eq!(chunk[1], chunk[2]);
    }
}

#[test]
fn rejects_non_positive_tolerance() {
    let mut k = ReferenceKernel::new();
    let solid = block(&mut k, 1.0, 1.0, 1.0);
    assert!(matches!(
        extract(&mut k, &solid, 0.0),
        Err(MeshError::InvalidTolerance { .. })
    ));
    assert!(matches!(
        extract(&mut k, &solid, f64::NAN),
        Err(MeshError::InvalidTolerance { .. })
    ));
}
