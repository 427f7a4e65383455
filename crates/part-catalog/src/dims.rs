use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::ConfigurationError;

/// Named working dimension of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dim {
    /// Nominal torque, used as the size class.
    Torque,
    Bore,
    /// Bore plus keyway depth, measured across the bore.
    BoreWithKeyway,
    KeywayDepth,
    KeyWidth,
    HubDiameter,
    FlangeDiameter,
    Length,
    JawHeight,
    FlangeWidth,
    ChamferDistance,
    FilletRadius,
    /// Rotation of the cutter and mount sketches about the part axis, radians.
    SketchAngle,
    PatternCount,
    /// Flank angle of a jaw tooth, radians.
    ToothTaper,
    /// Height of the bore-circle point on a keyway flank.
    KeyFlank,
    /// Distance of keyway corner lines from the part axis.
    FilletOffset,
    ToothBaseHalfWidth,
    ToothTipHalfWidth,
    MountHalfAngle,
    ChainPitch,
    TeethCount,
    RollerDiameter,
    Width,
    PitchDiameter,
    TipDiameter,
    SeatRadius,
    InnerDiameter,
    OuterDiameter,
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Fully resolved dimension set. Iteration order is the `Dim` order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDimensions {
    values: BTreeMap<Dim, f64>,
}

impl ResolvedDimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dim: Dim, value: f64) {
        self.values.insert(dim, value);
    }

    /// Value of `dim`, or an error naming it when it was never resolved.
    pub fn get(&self, dim: Dim) -> Result<f64, ConfigurationError> {
        self.values
            .get(&dim)
            .copied()
            .ok_or(ConfigurationError::NotResolved { dim })
    }

    /// Value of `dim` rounded to a count.
    pub fn count(&self, dim: Dim) -> Result<usize, ConfigurationError> {
        let v = self.get(dim)?;
        if v.is_finite() && v >= 1.0 {
            Ok(v.round() as usize)
        } else {
            Err(ConfigurationError::InvalidDerived {
                reason: format!("{dim} must be a positive count, got {v}"),
            })
        }
    }

    pub fn contains(&self, dim: Dim) -> bool {
        self.values.contains_key(&dim)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dim, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }
}

impl FromIterator<(Dim, f64)> for ResolvedDimensions {
    fn from_iter<I: IntoIterator<Item = (Dim, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
