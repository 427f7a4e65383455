//! Plain-text scenario reports.
//!
//! Reports are meant to be read by people debugging a failed scenario, so
//! they are structured text rather than JSON.

use std::fmt;

use part_catalog::{NoticeLevel, SelectionState};

use crate::oracle::OracleVerdict;
use crate::workflow::ScenarioOutcome;

/// Everything worth printing about one scenario run.
#[derive(Debug, Clone)]
pub struct PartReport {
    pub family: String,
    pub selection: SelectionState,
    pub dimensions: Vec<(String, f64)>,
    pub triangle_count: usize,
    pub bounding_box: Option<([f64; 3], [f64; 3])>,
    pub surface_area: f64,
    pub kernel_calls: usize,
    pub notices: Vec<(NoticeLevel, String)>,
    pub oracle_results: Vec<OracleVerdict>,
    pub error: Option<String>,
}

impl PartReport {
    pub fn from_outcome(outcome: &ScenarioOutcome) -> Self {
        let (dimensions, triangle_count, bounding_box, surface_area, notices) = match &outcome.result {
            Ok(output) => {
                let bb = output.mesh.bounding_box();
                (
                    output
                        .dimensions
                        .iter()
                        .map(|(dim, value)| (dim.to_string(), value))
                        .collect(),
                    output.mesh.triangle_count(),
                    (!output.mesh.is_empty())
                        .then(|| ([bb.min.x, bb.min.y, bb.min.z], [bb.max.x, bb.max.y, bb.max.z])),
                    output.mesh.surface_area(),
                    output
                        .notices
                        .iter()
                        .map(|n| (n.level, n.message.clone()))
                        .collect(),
                )
            }
            Err(_) => (Vec::new(), 0, None, 0.0, Vec::new()),
        };
        Self {
            family: outcome.family.clone(),
            selection: outcome.selection,
            dimensions,
            triangle_count,
            bounding_box,
            surface_area,
            kernel_calls: outcome.kernel_calls.len(),
            notices,
            oracle_results: outcome.verdicts.clone(),
            error: outcome.result.as_ref().err().map(|e| e.to_string()),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.oracle_results.iter().all(|v| v.passed)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Part Report: {} ===\n\n", self.family));
        match self.selection.row {
            Some(row) => out.push_str(&format!(
                "Selection: row {row}, variant {}\n",
                self.selection.variant.number()
            )),
            None => out.push_str("Selection: none\n"),
        }

        if !self.dimensions.is_empty() {
            out.push_str(&format!("\nDimensions ({}):\n", self.dimensions.len()));
            for (name, value) in &self.dimensions {
                out.push_str(&format!("  {name} = {value}\n"));
            }
        }

        out.push_str(&format!(
            "\nMesh: {} triangles, area {:.3}, {} kernel calls\n",
            self.triangle_count, self.surface_area, self.kernel_calls
        ));
        if let Some((min, max)) = self.bounding_box {
            out.push_str(&format!(
                "Bounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
                min[0], min[1], min[2], max[0], max[1], max[2],
            ));
        }

        if !self.notices.is_empty() {
            out.push_str("\nNotices:\n");
            for (level, message) in &self.notices {
                out.push_str(&format!("  [{level:?}] {message}\n"));
            }
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!("\nOracle Results ({} checks):\n", self.oracle_results.len()));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{status}] {}: {}\n", v.oracle_name, v.detail));
            }
        }

        match &self.error {
            Some(e) => out.push_str(&format!("\nError: {e}\n")),
            None => out.push_str("\nErrors: none\n"),
        }
        out
    }
}

impl fmt::Display for PartReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
