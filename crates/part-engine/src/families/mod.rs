//! Part families: catalog data, resolver configuration, recipes and sketches.

mod bushing;
mod coupling;
mod jaw;
mod sprocket;

use std::fmt;
use std::sync::Arc;

use modeling_ops::{ArcDirection, OpError, Profile2d};
use part_catalog::{
    resolve, CatalogTable, ConfigurationError, Resolution, ResolvedDimensions, ResolverSpec,
    SelectionState,
};
use part_geom::Point2d;
use sketch_contours::{Segment2d, SketchDrawing};

pub use bushing::Bushing;
pub use coupling::{CouplingHalf, CouplingPair};
pub use jaw::JawCouplingHalf;
pub use sprocket::Sprocket;

use crate::config::SelectionTolerances;
use crate::recipe::Recipe;

/// A family of catalog parts built by one recipe shape.
pub trait PartFamily: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn catalog(&self) -> &CatalogTable;

    fn resolver_spec(&self) -> ResolverSpec;

    /// Construction recipe for a resolved dimension set.
    fn recipe(
        &self,
        dims: &ResolvedDimensions,
        tolerances: &SelectionTolerances,
    ) -> Result<Recipe, ConfigurationError>;

    /// Section sketch of the base profile, with its main dimensions.
    fn sketch(&self, dims: &ResolvedDimensions) -> Result<SketchDrawing, ConfigurationError>;

    fn resolve(&self, selection: &SelectionState) -> Result<Resolution, ConfigurationError> {
        resolve(self.catalog(), selection, &self.resolver_spec())
    }
}

/// One instance of every built-in family.
pub fn builtin_families() -> Vec<Arc<dyn PartFamily>> {
    vec![
        Arc::new(CouplingHalf::default()),
        Arc::new(JawCouplingHalf::default()),
        Arc::new(Sprocket::default()),
        Arc::new(Bushing::default()),
        Arc::new(CouplingPair::default()),
    ]
}

pub(crate) fn invalid(reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidDerived {
        reason: reason.into(),
    }
}

pub(crate) fn profile_error(e: OpError) -> ConfigurationError {
    invalid(format!("profile: {e}"))
}

/// Hub section in the XY half-plane `y >= 0`, to be revolved about X:
/// a flange of diameter `flange_d` and width `flange_w` at the origin,
/// then a hub of diameter `hub_d` out to `length`.
pub(crate) fn hub_profile(length: f64, flange_w: f64, hub_d: f64, flange_d: f64) -> Profile2d {
    Profile2d::new(Point2d::ORIGIN)
        .line_to(Point2d::new(length, 0.0))
        .line_to(Point2d::new(length, hub_d / 2.0))
        .line_to(Point2d::new(flange_w, hub_d / 2.0))
        .line_to(Point2d::new(flange_w, flange_d / 2.0))
        .line_to(Point2d::new(0.0, flange_d / 2.0))
        .close()
}

/// Keyway cutter section: flanks at `±key_width / 2` from the bore circle
/// (at height `flank`) up to `top`, closed by the major arc of the bore.
pub(crate) fn keyway_profile(key_width: f64, flank: f64, top: f64) -> Profile2d {
    let half = key_width / 2.0;
    let start = Point2d::new(-half, flank);
    Profile2d::new(start)
        .line_to(Point2d::new(-half, top))
        .line_to(Point2d::new(half, top))
        .line_to(Point2d::new(half, flank))
        .arc_to(start, Point2d::ORIGIN, ArcDirection::Clockwise)
}

/// Height at which a keyway flank meets the bore circle.
pub(crate) fn keyway_flank(bore: f64, key_width: f64) -> Result<f64, ConfigurationError> {
    if key_width >= bore {
        return Err(invalid(format!(
            "key width {key_width} does not fit bore {bore}"
        )));
    }
    Ok(((bore / 2.0).powi(2) - (key_width / 2.0).powi(2)).sqrt())
}

/// Sketch of a closed profile by its vertices; arcs become chords.
pub(crate) fn outline_sketch(profile: &Profile2d) -> SketchDrawing {
    let mut vertices = profile.vertices();
    vertices.pop();
    let mut sketch = SketchDrawing::new();
    sketch.add_polyline(&vertices, true);
    sketch
}

pub(crate) fn dimension(sketch: &mut SketchDrawing, from: (f64, f64), to: (f64, f64)) {
    sketch.add_dimension_line(Segment2d::new(
        Point2d::new(from.0, from.1),
        Point2d::new(to.0, to.1),
    ));
}
