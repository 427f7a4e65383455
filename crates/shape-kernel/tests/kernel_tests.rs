use std::f64::consts::TAU;

use part_geom::{Point3d, Vec3};
use shape_kernel::*;

fn square_with_bore(k: &mut ReferenceKernel, half: f64, bore: f64) -> FaceHandle {
    let c = [(-half, -half), (half, -half), (half, half), (-half, half)];
    let edges = (0..4)
        .map(|i| {
            let (a, b) = (c[i], c[(i + 1) % 4]);
            k.make_line_edge(Point3d::new(a.0, a.1, 0.0), Point3d::new(b.0, b.1, 0.0))
                .unwrap()
        })
        .collect();
    let outer = k.make_wire(edges).unwrap();
    let circle = k
        .make_arc_edge(Point3d::ORIGIN, Vec3::Z, Point3d::new(bore, 0.0, 0.0), TAU)
        .unwrap();
    let hole = k.make_wire(vec![circle]).unwrap();
    k.make_face(outer, vec![hole]).unwrap()
}

#[test]
fn extrude_with_hole_has_bore_circles() {
    let mut k = ReferenceKernel::new();
    let face = square_with_bore(&mut k, 5.0, 2.0);
    let solid = k.extrude(face, Vec3::new(0.0, 0.0, 3.0)).unwrap();

    let circles: Vec<(Point3d, f64)> = k
        .list_edges(&solid)
        .into_iter()
        .filter_map(|e| k.circle_center_and_radius(e))
        .collect();
    assert_eq!(circles.len(), 2);
    assert!(circles.iter().all(|(_, r)| (r - 2.0).abs() < 1e-12));
    let mut heights: Vec<f64> = circles.iter().map(|(c, _)| c.z).collect();
    heights.sort_by(f64::total_cmp);
    assert_eq!(heights, vec![0.0, 3.0]);

    // Two caps, four flat sides, one bore wall.
    assert_eq!(k.list_faces(&solid).len(), 7);
}

#[test]
fn bore_can_be_chamfered() {
    let mut k = ReferenceKernel::new();
    let face = square_with_bore(&mut k, 5.0, 2.0);
    let solid = k.extrude(face, Vec3::new(0.0, 0.0, 3.0)).unwrap();
    let bore_edges: Vec<EdgeId> = k
        .list_edges(&solid)
        .into_iter()
        .filter(|e| k.edge_curve_type(*e) == Some(CurveKind::Circle))
        .collect();
    let solid = k.chamfer_edges(solid, &bore_edges, 0.5).unwrap();

    let mut radii: Vec<f64> = k
        .list_edges(&solid)
        .into_iter()
        .filter_map(|e| k.circle_center_and_radius(e))
        .map(|(_, r)| r)
        .collect();
    radii.sort_by(f64::total_cmp);
    // Each bore circle leaves one copy on the wall and one grown onto the cap.
    assert_eq!(radii.len(), 4);
    assert!((radii[0] - 2.0).abs() < 1e-9);
    assert!((radii[3] - 2.5).abs() < 1e-9);
}

#[test]
fn recording_kernel_counts_unions() {
    let mut k = RecordingKernel::new(ReferenceKernel::new());
    let mut parts = Vec::new();
    for i in 0..3 {
        let x = i as f64 * 2.0;
        let pts = [
            Point3d::new(x, 0.0, 0.0),
            Point3d::new(x + 1.0, 0.0, 0.0),
            Point3d::new(x + 1.0, 1.0, 0.0),
            Point3d::new(x, 1.0, 0.0),
        ];
        let edges = (0..4)
            .map(|j| k.make_line_edge(pts[j], pts[(j + 1) % 4]).unwrap())
            .collect();
        let wire = k.make_wire(edges).unwrap();
        let face = k.make_face(wire, Vec::new()).unwrap();
        parts.push(k.extrude(face, Vec3::Z).unwrap());
    }
    let mut iter = parts.into_iter();
    let mut acc = iter.next().unwrap();
    for p in iter {
        acc = k.boolean_union(acc, p).unwrap();
    }
    assert_eq!(k.union_count(), 2);
    assert_eq!(k.list_faces(&acc).len(), 18);
}

#[test]
fn triangulated_cap_covers_area_minus_bore() {
    let mut k = ReferenceKernel::new();
    let face = square_with_bore(&mut k, 5.0, 2.0);
    let solid = k.extrude(face, Vec3::new(0.0, 0.0, 1.0)).unwrap();
    k.triangulate(&solid, 0.01).unwrap();

    let cap = k.list_faces(&solid)[0];
    let tri = k.face_triangulation(cap).unwrap();
    let area: f64 = tri
        .triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.map(|i| tri.nodes[i]);
            (b - a).cross(&(c - a)).length() / 2.0
        })
        .sum();
    let expected = 100.0 - std::f64::consts::PI * 4.0;
    assert!((area - expected).abs() < 0.1, "cap area {area}");
}
