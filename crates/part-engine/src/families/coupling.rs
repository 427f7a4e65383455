use std::f64::consts::{FRAC_PI_4, PI};

use modeling_ops::SketchPlane;
use part_catalog::{
    CatalogTable, ConfigurationError, Dim, DimRule, DimSource, ResolvedDimensions, ResolverSpec,
};
use part_geom::{Transform, Vec3};
use sketch_contours::SketchDrawing;

use super::{dimension, hub_profile, invalid, keyway_flank, keyway_profile, outline_sketch, PartFamily};
use crate::config::SelectionTolerances;
use crate::recipe::{AxisLine, Recipe, RecipeStep};

const HEADINGS: [&str; 8] = ["T", "d", "d+t1", "b", "d1", "D", "l (exec. 1)", "l (exec. 2)"];

const ROWS: [[f64; 8]; 4] = [
    [6.3, 10.0, 11.4, 3.0, 18.0, 36.0, 23.0, 20.0],
    [16.0, 12.0, 13.8, 4.0, 22.0, 45.0, 30.0, 25.0],
    [31.5, 16.0, 18.3, 5.0, 28.0, 56.0, 40.0, 28.0],
    [63.0, 20.0, 22.8, 6.0, 34.0, 71.0, 50.0, 36.0],
];

const FLANGE_WIDTH: f64 = 4.5;

/// Gap between the two halves of a [`CouplingPair`].
pub const PAIR_GAP: f64 = 2.0;

fn derive(dims: &mut ResolvedDimensions) -> Result<(), ConfigurationError> {
    let bore = dims.get(Dim::Bore)?;
    let key = dims.get(Dim::KeyWidth)?;
    let top = dims.get(Dim::BoreWithKeyway)? - bore / 2.0;
    let hub = dims.get(Dim::HubDiameter)?;
    let flank = keyway_flank(bore, key)?;
    if top <= flank {
        return Err(invalid(format!("keyway top {top} lies inside the bore")));
    }
    if top >= hub / 2.0 {
        return Err(invalid(format!("keyway top {top} breaks through hub {hub}")));
    }
    if hub >= dims.get(Dim::FlangeDiameter)? {
        return Err(invalid("hub is not narrower than the flange"));
    }
    if dims.get(Dim::Length)? <= FLANGE_WIDTH {
        return Err(invalid("length does not clear the flange"));
    }
    dims.insert(Dim::KeyFlank, flank);
    dims.insert(Dim::KeywayDepth, top - bore / 2.0);
    dims.insert(Dim::FlangeWidth, FLANGE_WIDTH);
    dims.insert(Dim::SketchAngle, FRAC_PI_4);
    Ok(())
}

/// Flanged coupling half with a keyed bore.
#[derive(Debug, Clone)]
pub struct CouplingHalf {
    table: CatalogTable,
}

impl Default for CouplingHalf {
    fn default() -> Self {
        Self::with_table(CatalogTable::from_fixed(HEADINGS, &ROWS))
    }
}

impl CouplingHalf {
    /// Same recipe over another table laid out like the built-in one.
    pub fn with_table(table: CatalogTable) -> Self {
        Self { table }
    }
}

impl PartFamily for CouplingHalf {
    fn name(&self) -> &str {
        "coupling half"
    }

    fn catalog(&self) -> &CatalogTable {
        &self.table
    }

    fn resolver_spec(&self) -> ResolverSpec {
        ResolverSpec {
            rules: vec![
                DimRule::required(Dim::Torque, DimSource::Column(0)),
                DimRule::required(Dim::Bore, DimSource::Column(1)),
                DimRule::required(Dim::BoreWithKeyway, DimSource::Column(2)),
                DimRule::required(Dim::KeyWidth, DimSource::Column(3)),
                DimRule::required(Dim::HubDiameter, DimSource::Column(4)),
                DimRule::required(Dim::FlangeDiameter, DimSource::Column(5)),
                DimRule::required(Dim::Length, DimSource::ByVariant { first: 6, second: 7 }),
            ],
            size_class: None,
            derive: Some(derive),
        }
    }

    fn recipe(
        &self,
        dims: &ResolvedDimensions,
        _tolerances: &SelectionTolerances,
    ) -> Result<Recipe, ConfigurationError> {
        let length = dims.get(Dim::Length)?;
        let bore = dims.get(Dim::Bore)?;
        let profile = hub_profile(
            length,
            dims.get(Dim::FlangeWidth)?,
            dims.get(Dim::HubDiameter)?,
            dims.get(Dim::FlangeDiameter)?,
        );
        let cutter = keyway_profile(
            dims.get(Dim::KeyWidth)?,
            dims.get(Dim::KeyFlank)?,
            bore / 2.0 + dims.get(Dim::KeywayDepth)?,
        );
        Ok(Recipe::new(self.name())
            .with_step(RecipeStep::Revolve {
                name: "hub".into(),
                profile,
                plane: SketchPlane::xy(),
                axis: AxisLine::x(),
            })
            .with_step(RecipeStep::ExtrudeCut {
                name: "keyway".into(),
                profile: cutter,
                plane: SketchPlane::yz().rotated(dims.get(Dim::SketchAngle)?),
                vector: Vec3::new(length, 0.0, 0.0),
            }))
    }

    fn sketch(&self, dims: &ResolvedDimensions) -> Result<SketchDrawing, ConfigurationError> {
        let length = dims.get(Dim::Length)?;
        let flange_r = dims.get(Dim::FlangeDiameter)? / 2.0;
        let mut sketch = outline_sketch(&hub_profile(
            length,
            dims.get(Dim::FlangeWidth)?,
            dims.get(Dim::HubDiameter)?,
            flange_r * 2.0,
        ));
        dimension(&mut sketch, (0.0, -5.0), (length, -5.0));
        dimension(&mut sketch, (-5.0, 0.0), (-5.0, flange_r));
        Ok(sketch)
    }
}

/// Two coupling halves facing each other across [`PAIR_GAP`].
#[derive(Debug, Clone, Default)]
pub struct CouplingPair {
    half: CouplingHalf,
}

impl PartFamily for CouplingPair {
    fn name(&self) -> &str {
        "coupling pair"
    }

    fn catalog(&self) -> &CatalogTable {
        self.half.catalog()
    }

    fn resolver_spec(&self) -> ResolverSpec {
        self.half.resolver_spec()
    }

    fn recipe(
        &self,
        dims: &ResolvedDimensions,
        tolerances: &SelectionTolerances,
    ) -> Result<Recipe, ConfigurationError> {
        let half = self.half.recipe(dims, tolerances)?;
        let mirrored = Transform::translation(Vec3::new(-PAIR_GAP, 0.0, 0.0))
            .then(&Transform::rotation(Vec3::Y, PI));
        Ok(Recipe::new(self.name()).with_step(RecipeStep::Compound {
            name: "pair".into(),
            parts: vec![(half.clone(), Transform::identity()), (half, mirrored)],
        }))
    }

    fn sketch(&self, dims: &ResolvedDimensions) -> Result<SketchDrawing, ConfigurationError> {
        self.half.sketch(dims)
    }
}
