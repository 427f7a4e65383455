//! Declarative construction recipes.
//!
//! A recipe is an ordered list of steps. The first step makes the base solid;
//! every later step modifies it.

use modeling_ops::{EdgeSelector, Profile2d, SketchPlane};
use part_geom::{Point3d, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// An axis line through `origin` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLine {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl AxisLine {
    /// The model X axis.
    pub fn x() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            direction: Vec3::X,
        }
    }

    pub fn z() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            direction: Vec3::Z,
        }
    }
}

/// A feature solid for a radial pattern: a profile extruded from its own
/// sketch plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFeature {
    pub profile: Profile2d,
    pub plane: SketchPlane,
    pub vector: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecipeStep {
    /// Base solid: full revolution of a closed profile about `axis`.
    Revolve {
        name: String,
        profile: Profile2d,
        plane: SketchPlane,
        axis: AxisLine,
    },
    /// Base solid: a face with optional holes swept along `vector`.
    Extrude {
        name: String,
        profile: Profile2d,
        holes: Vec<Profile2d>,
        plane: SketchPlane,
        vector: Vec3,
    },
    /// Subtract a prism swept from `profile`.
    ExtrudeCut {
        name: String,
        profile: Profile2d,
        plane: SketchPlane,
        vector: Vec3,
    },
    Chamfer {
        name: String,
        selector: EdgeSelector,
        distance: f64,
    },
    Fillet {
        name: String,
        selector: EdgeSelector,
        radius: f64,
    },
    /// Union `count` rotated copies of every feature, spaced evenly about `axis`.
    RadialPattern {
        name: String,
        features: Vec<PatternFeature>,
        axis: AxisLine,
        count: usize,
    },
    /// Base solid: independently built sub-parts, placed and gathered
    /// without booleans.
    Compound {
        name: String,
        parts: Vec<(Recipe, Transform)>,
    },
}

impl RecipeStep {
    pub fn name(&self) -> &str {
        match self {
            RecipeStep::Revolve { name, .. }
            | RecipeStep::Extrude { name, .. }
            | RecipeStep::ExtrudeCut { name, .. }
            | RecipeStep::Chamfer { name, .. }
            | RecipeStep::Fillet { name, .. }
            | RecipeStep::RadialPattern { name, .. }
            | RecipeStep::Compound { name, .. } => name,
        }
    }

    /// Whether this step creates a solid from nothing.
    pub fn is_base(&self) -> bool {
        matches!(
            self,
            RecipeStep::Revolve { .. } | RecipeStep::Extrude { .. } | RecipeStep::Compound { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub family: String,
    pub steps: Vec<RecipeStep>,
}

impl Recipe {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: RecipeStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(RecipeStep::name).collect()
    }
}
