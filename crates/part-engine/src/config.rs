use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Tolerances used when building recipes and matching edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionTolerances {
    /// Edge selector comparisons (parallelism, offset from the axis).
    pub edge: f64,
    /// Profile corners closer than this are merged; also the closure test.
    pub profile_merge: f64,
}

impl Default for SelectionTolerances {
    fn default() -> Self {
        Self {
            edge: 1e-3,
            profile_merge: 1e-6,
        }
    }
}

/// Pipeline-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Kernel triangulation tolerance for mesh extraction.
    pub triangulation_tolerance: f64,
    /// Endpoint matching tolerance for sketch contours.
    pub contour_tolerance: f64,
    /// Length added at both ends of every extrude-cut tool.
    pub cut_overshoot: f64,
    pub selection: SelectionTolerances,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            triangulation_tolerance: 0.1,
            contour_tolerance: 0.1,
            cut_overshoot: 0.5,
            selection: SelectionTolerances::default(),
        }
    }
}

impl PipelineConfig {
    /// Fast previews while scrubbing through catalog rows.
    pub fn coarse() -> Self {
        Self {
            triangulation_tolerance: 0.5,
            ..Self::default()
        }
    }

    /// Export quality.
    pub fn fine() -> Self {
        Self {
            triangulation_tolerance: 0.01,
            ..Self::default()
        }
    }

    /// Parse from JSON; omitted fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let invalid = |e: serde_json::Error| PipelineError::InvalidConfig {
            reason: e.to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(text).map_err(invalid)?;
        if !value.is_object() {
            return Err(PipelineError::InvalidConfig {
                reason: "config must be a JSON object".to_string(),
            });
        }
        let config: Self = serde_json::from_value(value).map_err(invalid)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let checks = [
            ("triangulation_tolerance", self.triangulation_tolerance),
            ("contour_tolerance", self.contour_tolerance),
            ("selection.edge", self.selection.edge),
            ("selection.profile_merge", self.selection.profile_merge),
        ];
        for (name, value) in checks {
            if !(value > 0.0 && value.is_finite()) {
                return Err(PipelineError::InvalidConfig {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        if !(self.cut_overshoot >= 0.0 && self.cut_overshoot.is_finite()) {
            return Err(PipelineError::InvalidConfig {
                reason: format!("cut_overshoot must not be negative, got {}", self.cut_overshoot),
            });
        }
        Ok(())
    }
}
