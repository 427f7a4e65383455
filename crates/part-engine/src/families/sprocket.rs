use std::f64::consts::{PI, TAU};

use modeling_ops::{ArcDirection, Profile2d, SketchPlane};
use part_catalog::{
    CatalogTable, ConfigurationError, Dim, DimRule, DimSource, ResolvedDimensions, ResolverSpec,
};
use part_geom::{Point2d, Vec2, Vec3};
use sketch_contours::SketchDrawing;

use super::{dimension, invalid, outline_sketch, PartFamily};
use crate::config::SelectionTolerances;
use crate::recipe::{Recipe, RecipeStep};

const HEADINGS: [&str; 7] = ["t", "z", "d1", "b (exec. 1)", "b (exec. 2)", "d", "d (alt)"];

const ROWS: [[f64; 7]; 4] = [
    [12.7, 20.0, 8.51, 7.2, 5.4, 20.0, 22.0],
    [15.875, 18.0, 10.16, 9.0, 6.8, 25.0, 28.0],
    [19.05, 17.0, 11.91, 11.0, 8.2, 30.0, 32.0],
    [25.4, 15.0, 15.88, 15.0, 11.3, 0.0, 35.0],
];

/// Half-opening of a roller seat on either side of the radial line.
const SEAT_HALF_OPENING: f64 = 55.0 * PI / 180.0;

fn derive(dims: &mut ResolvedDimensions) -> Result<(), ConfigurationError> {
    let pitch = dims.get(Dim::ChainPitch)?;
    let teeth = dims.count(Dim::TeethCount)?;
    let roller = dims.get(Dim::RollerDiameter)?;
    if teeth < 3 {
        return Err(invalid(format!("{teeth} teeth is too few")));
    }
    let half_step = PI / teeth as f64;
    let pitch_d = pitch / half_step.sin();
    let tip_d = pitch * (0.532 + 1.0 / half_step.tan());
    let seat_r = 0.505 * roller + 0.069 * roller.cbrt();
    let root_d = pitch_d - 2.0 * seat_r;
    let bore = dims.get(Dim::Bore)?;
    if bore >= root_d {
        return Err(invalid(format!(
            "bore {bore} does not fit inside root diameter {root_d:.3}"
        )));
    }
    if tip_d <= pitch_d {
        return Err(invalid("tip diameter does not clear the pitch circle"));
    }
    dims.insert(Dim::PitchDiameter, pitch_d);
    dims.insert(Dim::TipDiameter, tip_d);
    dims.insert(Dim::SeatRadius, seat_r);
    Ok(())
}

fn dir(angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c, s)
}

/// Tooth outline: for each tooth a flat tip, a flank down to the next roller
/// seat, the seat arc and a flank up to the following tip.
fn outline(teeth: usize, pitch_d: f64, tip_d: f64, seat_r: f64) -> Profile2d {
    let step = TAU / teeth as f64;
    let tip_half = step / 8.0;
    let start = Point2d::polar(tip_d / 2.0, -tip_half);
    let mut profile = Profile2d::new(start);
    for i in 0..teeth {
        let seat_angle = (i as f64 + 0.5) * step;
        let center = Point2d::polar(pitch_d / 2.0, seat_angle);
        let seat_in = center + dir(seat_angle + PI + SEAT_HALF_OPENING) * seat_r;
        let seat_out = center + dir(seat_angle + PI - SEAT_HALF_OPENING) * seat_r;
        let next_tip = if i + 1 == teeth {
            start
        } else {
            Point2d::polar(tip_d / 2.0, (i + 1) as f64 * step - tip_half)
        };
        profile = profile
            .line_to(Point2d::polar(tip_d / 2.0, i as f64 * step + tip_half))
            .line_to(seat_in)
            .arc_to(seat_out, center, ArcDirection::Clockwise)
            .line_to(next_tip);
    }
    profile
}

/// Roller-chain sprocket plate with a plain bore.
#[derive(Debug, Clone)]
pub struct Sprocket {
    table: CatalogTable,
}

impl Default for Sprocket {
    fn default() -> Self {
        Self::with_table(CatalogTable::from_fixed(HEADINGS, &ROWS))
    }
}

impl Sprocket {
    pub fn with_table(table: CatalogTable) -> Self {
        Self { table }
    }

    fn outline(dims: &ResolvedDimensions) -> Result<Profile2d, ConfigurationError> {
        Ok(outline(
            dims.count(Dim::TeethCount)?,
            dims.get(Dim::PitchDiameter)?,
            dims.get(Dim::TipDiameter)?,
            dims.get(Dim::SeatRadius)?,
        ))
    }
}

impl PartFamily for Sprocket {
    fn name(&self) -> &str {
        "sprocket"
    }

    fn catalog(&self) -> &CatalogTable {
        &self.table
    }

    fn resolver_spec(&self) -> ResolverSpec {
        ResolverSpec {
            rules: vec![
                DimRule::required(Dim::ChainPitch, DimSource::Column(0)),
                DimRule::required(Dim::TeethCount, DimSource::Column(1)),
                DimRule::required(Dim::RollerDiameter, DimSource::Column(2)),
                DimRule::required(Dim::Width, DimSource::ByVariant { first: 3, second: 4 }),
                DimRule::required(
                    Dim::Bore,
                    DimSource::Fallback {
                        primary: 5,
                        alternate: 6,
                    },
                ),
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
        let bore = Profile2d::circle(Point2d::ORIGIN, dims.get(Dim::Bore)? / 2.0);
        Ok(Recipe::new(self.name()).with_step(RecipeStep::Extrude {
            name: "plate".into(),
            profile: Self::outline(dims)?,
            holes: vec![bore],
            plane: SketchPlane::xy(),
            vector: Vec3::new(0.0, 0.0, dims.get(Dim::Width)?),
        }))
    }

    fn sketch(&self, dims: &ResolvedDimensions) -> Result<SketchDrawing, ConfigurationError> {
        let mut sketch = outline_sketch(&Self::outline(dims)?);
        let tip_r = dims.get(Dim::TipDiameter)? / 2.0;
        dimension(&mut sketch, (-tip_r, -tip_r - 5.0), (tip_r, -tip_r - 5.0));
        Ok(sketch)
    }
}
