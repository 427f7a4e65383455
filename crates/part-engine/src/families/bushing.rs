use modeling_ops::{Profile2d, SketchPlane};
use part_catalog::{
    CatalogTable, ConfigurationError, Dim, DimRule, DimSource, ResolvedDimensions, ResolverSpec,
};
use part_geom::Point2d;
use sketch_contours::SketchDrawing;

use super::{dimension, invalid, outline_sketch, profile_error, PartFamily};
use crate::config::SelectionTolerances;
use crate::recipe::{AxisLine, Recipe, RecipeStep};

const HEADINGS: [&str; 5] = ["d", "D", "L (exec. 1)", "L (exec. 2)", "c"];

const ROWS: [[f64; 5]; 5] = [
    [10.0, 16.0, 10.0, 16.0, 0.5],
    [12.0, 18.0, 12.0, 20.0, 0.5],
    [16.0, 22.0, 16.0, 25.0, 0.8],
    [20.0, 28.0, 20.0, 30.0, 1.0],
    [25.0, 32.0, 0.0, 40.0, 1.0],
];

fn derive(dims: &mut ResolvedDimensions) -> Result<(), ConfigurationError> {
    let inner = dims.get(Dim::InnerDiameter)?;
    let outer = dims.get(Dim::OuterDiameter)?;
    let length = dims.get(Dim::Length)?;
    let chamfer = dims.get(Dim::ChamferDistance)?;
    if inner >= outer {
        return Err(invalid(format!("inner diameter {inner} is not below {outer}")));
    }
    if chamfer >= (outer - inner) / 2.0 || chamfer >= length / 2.0 {
        return Err(invalid(format!("chamfer {chamfer} does not fit the section")));
    }
    Ok(())
}

/// Section with both outer corners chamfered, in the XY half-plane above X.
fn section(inner: f64, outer: f64, length: f64, chamfer: f64, merge: f64) -> Result<Profile2d, ConfigurationError> {
    let (r, big) = (inner / 2.0, outer / 2.0);
    Profile2d::polygon(
        &[
            Point2d::new(0.0, r),
            Point2d::new(length, r),
            Point2d::new(length, big - chamfer),
            Point2d::new(length - chamfer, big),
            Point2d::new(chamfer, big),
            Point2d::new(0.0, big - chamfer),
        ],
        merge,
    )
    .map_err(profile_error)
}

/// Plain cylindrical bushing with chamfered outer edges.
#[derive(Debug, Clone)]
pub struct Bushing {
    table: CatalogTable,
}

impl Default for Bushing {
    fn default() -> Self {
        Self::with_table(CatalogTable::from_fixed(HEADINGS, &ROWS))
    }
}

impl Bushing {
    pub fn with_table(table: CatalogTable) -> Self {
        Self { table }
    }

    fn section(dims: &ResolvedDimensions, merge: f64) -> Result<Profile2d, ConfigurationError> {
        section(
            dims.get(Dim::InnerDiameter)?,
            dims.get(Dim::OuterDiameter)?,
            dims.get(Dim::Length)?,
            dims.get(Dim::ChamferDistance)?,
            merge,
        )
    }
}

impl PartFamily for Bushing {
    fn name(&self) -> &str {
        "bushing"
    }

    fn catalog(&self) -> &CatalogTable {
        &self.table
    }

    fn resolver_spec(&self) -> ResolverSpec {
        ResolverSpec {
            rules: vec![
                DimRule::required(Dim::InnerDiameter, DimSource::Column(0)),
                DimRule::required(Dim::OuterDiameter, DimSource::Column(1)),
                DimRule::required(Dim::Length, DimSource::ByVariant { first: 2, second: 3 }),
                DimRule::required(Dim::ChamferDistance, DimSource::Column(4)),
            ],
            size_class: None,
            derive: Some(derive),
        }
    }

    fn recipe(
        &self,
        dims: &ResolvedDimensions,
        tolerances: &SelectionTolerances,
    ) -> Result<Recipe, ConfigurationError> {
        Ok(Recipe::new(self.name()).with_step(RecipeStep::Revolve {
            name: "body".into(),
            profile: Self::section(dims, tolerances.profile_merge)?,
            plane: SketchPlane::xy(),
            axis: AxisLine::x(),
        }))
    }

    fn sketch(&self, dims: &ResolvedDimensions) -> Result<SketchDrawing, ConfigurationError> {
        let mut sketch = outline_sketch(&Self::section(dims, SelectionTolerances::default().profile_merge)?);
        let length = dims.get(Dim::Length)?;
        let outer = dims.get(Dim::OuterDiameter)?;
        dimension(&mut sketch, (0.0, -2.0), (length, -2.0));
        dimension(&mut sketch, (-2.0, 0.0), (-2.0, outer / 2.0));
        Ok(sketch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use part_catalog::{SelectionState, Variant};

    #[test]
    fn test_missing_length_for_first_variant() {
        let family = Bushing::default();
        let err = family
            .resolve(&SelectionState::configured(4, Variant::First))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingDimension {
                dim: Dim::Length,
                row: 4,
                ..
            }
        ));
        assert!(family
            .resolve(&SelectionState::configured(4, Variant::Second))
            .is_ok());
    }

    #[test]
    fn test_oversized_chamfer_is_rejected() {
        let table = CatalogTable::from_fixed(HEADINGS, &[[10.0, 12.0, 10.0, 10.0, 1.5]]);
        let family = Bushing::with_table(table);
        assert!(matches!(
            family.resolve(&SelectionState::configured(0, Variant::First)),
            Err(ConfigurationError::InvalidDerived { .. })
        ));
    }

    #[test]
    fn test_section_has_six_sides() {
        let p = section(10.0, 16.0, 10.0, 0.5, 1e-6).unwrap();
        assert_eq!(p.segments.len(), 6);
        assert!(p.vertices().iter().all(|v| v.y >= 5.0));
    }
}
