//! Assertion helpers with diagnostic output.
//!
//! Failures carry the expected and actual values plus a caller-supplied
//! context string.

use mesh_extract::TriangleBuffer;
use part_catalog::Notice;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;

/// Fail with every failed verdict listed.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failed: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("{}: {}", v.oracle_name, v.detail))
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{ctx}] {} oracle(s) failed:\n  {}", failed.len(), failed.join("\n  ")),
        })
    }
}

/// Assert the mesh bounding box matches expected values within tolerance.
pub fn assert_bounding_box(
    mesh: &TriangleBuffer,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let bb = mesh.bounding_box();
    let actual_min = [bb.min.x, bb.min.y, bb.min.z];
    let actual_max = [bb.max.x, bb.max.y, bb.max.z];
    for i in 0..3 {
        if (actual_min[i] - expected_min[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{ctx}] bounding box min[{i}]: expected {:.3}, got {:.3} (tol={tol})",
                    expected_min[i], actual_min[i],
                ),
            });
        }
        if (actual_max[i] - expected_max[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{ctx}] bounding box max[{i}]: expected {:.3}, got {:.3} (tol={tol})",
                    expected_max[i], actual_max[i],
                ),
            });
        }
    }
    Ok(())
}

/// Assert some notice contains `needle`.
pub fn assert_notice(notices: &[Notice], needle: &str, ctx: &str) -> Result<(), HarnessError> {
    if notices.iter().any(|n| n.message.contains(needle)) {
        return Ok(());
    }
    let seen: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
    Err(HarnessError::AssertionFailed {
        detail: format!("[{ctx}] no notice contains {needle:?}. Seen: {seen:?}"),
    })
}
