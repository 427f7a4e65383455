use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};

use modeling_ops::{ArcDirection, EdgeSelector, Profile2d, Side, SketchPlane};
use part_catalog::{
    CatalogTable, ConfigurationError, Dim, DimRule, DimSource, ResolvedDimensions, ResolverSpec,
    SizeClassRule,
};
use part_geom::{Axis, Point2d, Vec3};
use sketch_contours::SketchDrawing;

use super::{
    dimension, hub_profile, invalid, keyway_flank, keyway_profile, outline_sketch, profile_error,
    PartFamily,
};
use crate::config::SelectionTolerances;
use crate::recipe::{AxisLine, PatternFeature, Recipe, RecipeStep};

const HEADINGS: [&str; 10] = [
    "T",
    "d",
    "d (alt)",
    "t1",
    "b",
    "d1",
    "D",
    "l (exec. 1)",
    "l (exec. 2)",
    "h",
];

const ROWS: [[f64; 10]; 7] = [
    [6.3, 10.0, 11.0, 1.4, 3.0, 20.0, 40.0, 23.0, 20.0, 8.0],
    [16.0, 12.0, 14.0, 1.8, 4.0, 25.0, 53.0, 30.0, 25.0, 10.0],
    [31.5, 0.0, 16.0, 2.3, 5.0, 32.0, 71.0, 40.0, 28.0, 12.0],
    [63.0, 20.0, 22.0, 2.8, 6.0, 40.0, 85.0, 50.0, 36.0, 14.0],
    [125.0, 25.0, 28.0, 3.3, 8.0, 50.0, 105.0, 60.0, 42.0, 16.0],
    [250.0, 32.0, 0.0, 3.3, 10.0, 63.0, 135.0, 80.0, 58.0, 20.0],
    [500.0, 0.0, 0.0, 3.8, 12.0, 80.0, 170.0, 110.0, 82.0, 25.0],
];

/// Torque at or below which the small construction constants apply.
const SIZE_CUTOFF: f64 = 63.0;

/// Tooth tip half-widths below this collapse to a point.
const TIP_EPSILON: f64 = 1e-9;

fn derive(dims: &mut ResolvedDimensions) -> Result<(), ConfigurationError> {
    let bore = dims.get(Dim::Bore)?;
    let key = dims.get(Dim::KeyWidth)?;
    let top = bore / 2.0 + dims.get(Dim::KeywayDepth)?;
    let hub = dims.get(Dim::HubDiameter)?;
    let outer = dims.get(Dim::FlangeDiameter)?;
    let flank = keyway_flank(bore, key)?;
    if top >= hub / 2.0 {
        return Err(invalid(format!("keyway top {top} breaks through hub {hub}")));
    }
    if hub >= outer {
        return Err(invalid("hub is not narrower than the flange"));
    }
    if dims.get(Dim::Length)? <= dims.get(Dim::FlangeWidth)? {
        return Err(invalid("length does not clear the flange"));
    }

    let ring = outer - hub;
    let base = ring / 4.0;
    let mut tip = base - ring / 2.0 * dims.get(Dim::ToothTaper)?.tan();
    if tip.abs() < TIP_EPSILON {
        tip = 0.0;
    }
    if tip < 0.0 {
        return Err(invalid(format!("tooth taper leaves a negative tip width {tip}")));
    }
    let count = dims.count(Dim::PatternCount)?;

    dims.insert(Dim::KeyFlank, flank);
    dims.insert(Dim::FilletOffset, (key / 2.0).hypot(top));
    dims.insert(Dim::ToothBaseHalfWidth, base);
    dims.insert(Dim::ToothTipHalfWidth, tip);
    dims.insert(Dim::MountHalfAngle, PI / (4.0 * count as f64));
    Ok(())
}

/// Annular sector between `inner` and `outer` radius, centred on sketch +y.
fn mount_profile(inner: f64, outer: f64, half_angle: f64) -> Profile2d {
    let (lo, hi) = (FRAC_PI_2 - half_angle, FRAC_PI_2 + half_angle);
    let start = Point2d::polar(inner, lo);
    Profile2d::new(start)
        .line_to(Point2d::polar(outer, lo))
        .arc_to(Point2d::polar(outer, hi), Point2d::ORIGIN, ArcDirection::CounterClockwise)
        .line_to(Point2d::polar(inner, hi))
        .arc_to(start, Point2d::ORIGIN, ArcDirection::Clockwise)
}

/// Trapezoidal tooth standing on sketch +y; a zero tip makes a triangle.
fn tooth_profile(
    inner: f64,
    outer: f64,
    base: f64,
    tip: f64,
    merge: f64,
) -> Result<Profile2d, ConfigurationError> {
    Profile2d::polygon(
        &[
            Point2d::new(-base, inner),
            Point2d::new(base, inner),
            Point2d::new(tip, outer),
            Point2d::new(-tip, outer),
        ],
        merge,
    )
    .map_err(profile_error)
}

/// Jaw coupling half: flanged hub with keyed bore and a ring of jaws.
#[derive(Debug, Clone)]
pub struct JawCouplingHalf {
    table: CatalogTable,
}

impl Default for JawCouplingHalf {
    fn default() -> Self {
        Self::with_table(CatalogTable::from_fixed(HEADINGS, &ROWS))
    }
}

impl JawCouplingHalf {
    pub fn with_table(table: CatalogTable) -> Self {
        Self { table }
    }
}

impl PartFamily for JawCouplingHalf {
    fn name(&self) -> &str {
        "jaw coupling half"
    }

    fn catalog(&self) -> &CatalogTable {
        &self.table
    }

    fn resolver_spec(&self) -> ResolverSpec {
        ResolverSpec {
            rules: vec![
                DimRule::required(Dim::Torque, DimSource::Column(0)),
                DimRule::required(
                    Dim::Bore,
                    DimSource::Fallback {
                        primary: 1,
                        alternate: 2,
                    },
                ),
                DimRule::required(Dim::KeywayDepth, DimSource::Column(3)),
                DimRule::required(Dim::KeyWidth, DimSource::Column(4)),
                DimRule::required(Dim::HubDiameter, DimSource::Column(5)),
                DimRule::required(Dim::FlangeDiameter, DimSource::Column(6)),
                DimRule::required(Dim::Length, DimSource::ByVariant { first: 7, second: 8 }),
                DimRule::required(Dim::JawHeight, DimSource::Column(9)),
            ],
            size_class: Some(SizeClassRule {
                column: 0,
                cutoff: SIZE_CUTOFF,
                at_or_below: vec![
                    (Dim::FlangeWidth, 8.0),
                    (Dim::ChamferDistance, 0.5),
                    (Dim::FilletRadius, 0.4),
                    (Dim::SketchAngle, FRAC_PI_4),
                    (Dim::PatternCount, 2.0),
                    (Dim::ToothTaper, 15f64.to_radians()),
                ],
                above: vec![
                    (Dim::FlangeWidth, 12.0),
                    (Dim::ChamferDistance, 1.0),
                    (Dim::FilletRadius, 0.6),
                    (Dim::SketchAngle, FRAC_PI_6),
                    (Dim::PatternCount, 3.0),
                    (Dim::ToothTaper, 0.5f64.atan()),
                ],
            }),
            derive: Some(derive),
        }
    }

    fn recipe(
        &self,
        dims: &ResolvedDimensions,
        tolerances: &SelectionTolerances,
    ) -> Result<Recipe, ConfigurationError> {
        let length = dims.get(Dim::Length)?;
        let flange = dims.get(Dim::FlangeWidth)?;
        let bore = dims.get(Dim::Bore)?;
        let hub = dims.get(Dim::HubDiameter)?;
        let outer = dims.get(Dim::FlangeDiameter)?;
        let height = dims.get(Dim::JawHeight)?;
        let angle = dims.get(Dim::SketchAngle)?;
        let chamfer = dims.get(Dim::ChamferDistance)?;
        let count = dims.count(Dim::PatternCount)?;
        let (r_in, r_out) = (hub / 2.0, outer / 2.0);
        let jaw_vector = Vec3::new(-height, 0.0, 0.0);

        let mount = PatternFeature {
            profile: mount_profile(r_in, r_out, dims.get(Dim::MountHalfAngle)?),
            plane: SketchPlane::yz().rotated(angle),
            vector: jaw_vector,
        };
        let tooth = PatternFeature {
            profile: tooth_profile(
                r_in,
                r_out,
                dims.get(Dim::ToothBaseHalfWidth)?,
                dims.get(Dim::ToothTipHalfWidth)?,
                tolerances.profile_merge,
            )?,
            plane: SketchPlane::yz().rotated(angle + PI / count as f64),
            vector: jaw_vector,
        };

        Ok(Recipe::new(self.name())
            .with_step(RecipeStep::Revolve {
                name: "hub".into(),
                profile: hub_profile(length, flange, hub, outer),
                plane: SketchPlane::xy(),
                axis: AxisLine::x(),
            })
            .with_step(RecipeStep::ExtrudeCut {
                name: "keyway".into(),
                profile: keyway_profile(
                    dims.get(Dim::KeyWidth)?,
                    dims.get(Dim::KeyFlank)?,
                    bore / 2.0 + dims.get(Dim::KeywayDepth)?,
                ),
                plane: SketchPlane::yz().rotated(angle),
                vector: Vec3::new(length, 0.0, 0.0),
            })
            .with_step(RecipeStep::Chamfer {
                name: "hub chamfer".into(),
                selector: EdgeSelector::CircleCenterBeyond {
                    axis: Axis::X,
                    threshold: flange,
                    side: Side::Above,
                },
                distance: chamfer,
            })
            .with_step(RecipeStep::Fillet {
                name: "keyway fillet".into(),
                selector: EdgeSelector::AxialLineAtOffset {
                    axis: Axis::X,
                    offset: dims.get(Dim::FilletOffset)?,
                    tolerance: tolerances.edge,
                },
                radius: dims.get(Dim::FilletRadius)?,
            })
            .with_step(RecipeStep::RadialPattern {
                name: "jaws".into(),
                features: vec![mount, tooth],
                axis: AxisLine::x(),
                count,
            })
            .with_step(RecipeStep::Chamfer {
                name: "jaw chamfer".into(),
                selector: EdgeSelector::CircleCenterBeyond {
                    axis: Axis::X,
                    threshold: -height / 2.0,
                    side: Side::Below,
                },
                distance: chamfer,
            }))
    }

    fn sketch(&self, dims: &ResolvedDimensions) -> Result<SketchDrawing, ConfigurationError> {
        let length = dims.get(Dim::Length)?;
        let outer = dims.get(Dim::FlangeDiameter)?;
        let mut sketch = outline_sketch(&hub_profile(
            length,
            dims.get(Dim::FlangeWidth)?,
            dims.get(Dim::HubDiameter)?,
            outer,
        ));
        dimension(&mut sketch, (0.0, -5.0), (length, -5.0));
        dimension(&mut sketch, (-5.0, 0.0), (-5.0, outer / 2.0));
        Ok(sketch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use part_catalog::{SelectionState, Variant};

    fn dims(row: usize) -> ResolvedDimensions {
        JawCouplingHalf::default()
            .resolve(&SelectionState::configured(row, Variant::First))
            .unwrap()
            .dimensions
    }

    #[test]
    fn test_small_size_class() {
        let d = dims(0);
        assert_eq!(d.count(Dim::PatternCount), Ok(2));
        assert_eq!(d.get(Dim::FlangeWidth), Ok(8.0));
        assert!((d.get(Dim::ToothBaseHalfWidth).unwrap() - 5.0).abs() < 1e-12);
        assert!(d.get(Dim::ToothTipHalfWidth).unwrap() > 0.0);
        assert!((d.get(Dim::MountHalfAngle).unwrap() - PI / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_large_size_class_makes_triangular_teeth() {
        let d = dims(4);
        assert_eq!(d.count(Dim::PatternCount), Ok(3));
        assert_eq!(d.get(Dim::ToothTipHalfWidth), Ok(0.0));
        let tooth = tooth_profile(25.0, 52.5, 13.75, 0.0, 1e-6).unwrap();
        assert_eq!(tooth.segments.len(), 3);
    }

    #[test]
    fn test_fillet_offset_is_keyway_corner_distance() {
        let d = dims(0);
        let expected = 1.5f64.hypot(5.0 + 1.4);
        assert!((d.get(Dim::FilletOffset).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_recipe_has_six_steps() {
        let family = JawCouplingHalf::default();
        let recipe = family.recipe(&dims(1), &SelectionTolerances::default()).unwrap();
        assert_eq!(
            recipe.step_names(),
            ["hub", "keyway", "hub chamfer", "keyway fillet", "jaws", "jaw chamfer"]
        );
        let RecipeStep::RadialPattern { features, count, .. } = &recipe.steps[4] else {
            panic!("step 5 must be the pattern");
        };
        assert_eq!(*count, 2);
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.vector.x == -10.0));
    }

    #[test]
    fn test_mount_sector_is_closed() {
        let m = mount_profile(10.0, 20.0, PI / 8.0);
        assert!(m.is_closed(1e-12));
        assert_eq!(m.segments.len(), 4);
    }
}
