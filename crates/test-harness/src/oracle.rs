//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an [`OracleVerdict`] with diagnostic detail instead of
//! panicking, so a scenario can collect every failure in one pass.

use file_format::{export_ascii_stl, import_ascii_stl};
use mesh_extract::TriangleBuffer;
use part_geom::BoundingBox;

use crate::helpers::{cross, length, sub};

/// The result of a single oracle check.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::pass(name, detail)
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::fail(name, detail)
        }
    }
}

/// Normal tolerance for unit-length checks.
const UNIT_TOLERANCE: f64 = 1e-3;

// ── Buffer shape ────────────────────────────────────────────────────────────

pub fn check_non_empty(mesh: &TriangleBuffer) -> OracleVerdict {
    let t = mesh.triangle_count();
    if t > 0 {
        OracleVerdict::pass_val("non_empty", format!("{t} triangles"), t as f64)
    } else {
        OracleVerdict::fail_val("non_empty", "mesh has no triangles".to_string(), 0.0)
    }
}

pub fn check_finite(mesh: &TriangleBuffer) -> OracleVerdict {
    let bad = mesh
        .triangles()
        .iter()
        .flatten()
        .chain(mesh.normals().iter())
        .flatten()
        .filter(|c| !c.is_finite())
        .count();
    if bad == 0 {
        OracleVerdict::pass("finite", "all coordinates finite".to_string())
    } else {
        OracleVerdict::fail_val("finite", format!("{bad} non-finite components"), bad as f64)
    }
}

// ── Normals ─────────────────────────────────────────────────────────────────

/// Every normal has unit length, except the zero normal of a zero-area
/// triangle.
pub fn check_unit_normals(mesh: &TriangleBuffer) -> OracleVerdict {
    let mut worst = 0.0f64;
    let mut bad = 0usize;
    for n in mesh.normals() {
        let len = length([f64::from(n[0]), f64::from(n[1]), f64::from(n[2])]);
        if len == 0.0 {
            continue;
        }
        let err = (len - 1.0).abs();
        worst = worst.max(err);
        if err > UNIT_TOLERANCE {
            bad += 1;
        }
    }
    if bad == 0 {
        OracleVerdict::pass_val("unit_normals", format!("max length error {worst:.2e}"), worst)
    } else {
        OracleVerdict::fail_val(
            "unit_normals",
            format!("{bad} normals off unit length, worst error {worst:.2e}"),
            worst,
        )
    }
}

/// Each triangle's first normal points the same way as its winding.
pub fn check_normals_follow_winding(mesh: &TriangleBuffer) -> OracleVerdict {
    let mut flipped = Vec::new();
    for (i, ([a, b, c], normals)) in mesh.facets().enumerate() {
        let face = cross(sub(*b, *a), sub(*c, *a));
        let n = normals[0];
        let dot = face[0] * f64::from(n[0]) + face[1] * f64::from(n[1]) + face[2] * f64::from(n[2]);
        if length(face) > 0.0 && dot < 0.0 {
            flipped.push(i);
        }
    }
    if flipped.is_empty() {
        OracleVerdict::pass("normals_follow_winding", "all normals agree".to_string())
    } else {
        OracleVerdict::fail_val(
            "normals_follow_winding",
            format!("triangles {:?} have reversed normals", &flipped[..flipped.len().min(8)]),
            flipped.len() as f64,
        )
    }
}

/// Share of triangles with (near) zero area, checked against `max_fraction`.
pub fn check_degenerate_fraction(mesh: &TriangleBuffer, max_fraction: f64) -> OracleVerdict {
    if mesh.is_empty() {
        return OracleVerdict::pass_val("degenerate_fraction", "empty mesh".to_string(), 0.0);
    }
    let degenerate = mesh
        .triangles()
        .iter()
        .filter(|[a, b, c]| length(cross(sub(*b, *a), sub(*c, *a))) < 1e-12)
        .count();
    let fraction = degenerate as f64 / mesh.triangle_count() as f64;
    let detail = format!("{degenerate} of {} triangles degenerate", mesh.triangle_count());
    if fraction <= max_fraction {
        OracleVerdict::pass_val("degenerate_fraction", detail, fraction)
    } else {
        OracleVerdict::fail_val("degenerate_fraction", detail, fraction)
    }
}

// ── Geometry ────────────────────────────────────────────────────────────────

/// Mesh bounds match `expected` per axis within `tol`.
pub fn check_bounding_box(mesh: &TriangleBuffer, expected: &BoundingBox, tol: f64) -> OracleVerdict {
    let actual = mesh.bounding_box();
    let diffs = [
        actual.min.x - expected.min.x,
        actual.min.y - expected.min.y,
        actual.min.z - expected.min.z,
        actual.max.x - expected.max.x,
        actual.max.y - expected.max.y,
        actual.max.z - expected.max.z,
    ];
    let worst = diffs.iter().fold(0.0f64, |m, d| m.max(d.abs()));
    let detail = format!(
        "({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3}), worst deviation {worst:.3}",
        actual.min.x, actual.min.y, actual.min.z, actual.max.x, actual.max.y, actual.max.z,
    );
    if worst <= tol {
        OracleVerdict::pass_val("bounding_box", detail, worst)
    } else {
        OracleVerdict::fail_val("bounding_box", detail, worst)
    }
}

/// Surface area within `rel_tol` of `expected`.
pub fn check_surface_area(mesh: &TriangleBuffer, expected: f64, rel_tol: f64) -> OracleVerdict {
    let area = mesh.surface_area();
    let rel = (area - expected).abs() / expected.abs().max(f64::MIN_POSITIVE);
    let detail = format!("area {area:.3}, expected {expected:.3} (rel error {rel:.2e})");
    if rel <= rel_tol {
        OracleVerdict::pass_val("surface_area", detail, area)
    } else {
        OracleVerdict::fail_val("surface_area", detail, area)
    }
}

// ── Interchange ─────────────────────────────────────────────────────────────

/// Exporting to ASCII STL and reading it back reproduces the buffer, for
/// buffers whose corners share one normal per triangle.
pub fn check_stl_round_trip(mesh: &TriangleBuffer) -> OracleVerdict {
    let text = export_ascii_stl(mesh, "oracle");
    match import_ascii_stl(&text) {
        Ok(doc) if doc.mesh == *mesh => {
            OracleVerdict::pass_val("stl_round_trip", format!("{} bytes", text.len()), text.len() as f64)
        }
        Ok(doc) => OracleVerdict::fail(
            "stl_round_trip",
            format!(
                "read back {} triangles, wrote {}",
                doc.mesh.triangle_count(),
                mesh.triangle_count()
            ),
        ),
        Err(e) => OracleVerdict::fail("stl_round_trip", format!("import failed: {e}")),
    }
}

/// The oracles every successful build must pass.
pub fn run_mesh_oracles(mesh: &TriangleBuffer) -> Vec<OracleVerdict> {
    vec![
        check_non_empty(mesh),
        check_finite(mesh),
        check_unit_normals(mesh),
        check_normals_follow_winding(mesh),
        check_stl_round_trip(mesh),
    ]
}
