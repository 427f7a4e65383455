//! Feature construction sequencer.
//!
//! Runs recipe steps in order against one kernel. A step failure aborts the
//! build and is tagged with the step name; the partially built solid is
//! dropped, never returned.

use modeling_ops::{
    execute_boolean, execute_chamfer, execute_extrude, execute_fillet, execute_radial_pattern,
    execute_revolve, select_edges, BooleanKind, KernelBundle, OpError, Profile2d, SketchPlane,
};
use part_catalog::Notice;
use part_geom::Vec3;
use shape_kernel::SolidHandle;
use tracing::{debug, info, info_span, instrument, warn};

use crate::config::PipelineConfig;
use crate::recipe::{Recipe, RecipeStep};

#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: OpError,
    },

    #[error("invalid recipe: {reason}")]
    InvalidRecipe { reason: String },
}

impl BuildError {
    /// Name of the failing step, if a step failed.
    pub fn step(&self) -> Option<&str> {
        match self {
            BuildError::StepFailed { step, .. } => Some(step),
            BuildError::InvalidRecipe { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct BuildOutput {
    pub solid: SolidHandle,
    pub notices: Vec<Notice>,
}

fn check_closed(step: &str, profile: &Profile2d, tolerance: f64) -> Result<(), BuildError> {
    if profile.is_closed(tolerance) {
        Ok(())
    } else {
        Err(BuildError::InvalidRecipe {
            reason: format!("step '{step}': profile is not closed"),
        })
    }
}

/// Structural checks: exactly one base step, first; closed profiles.
pub fn validate(recipe: &Recipe, config: &PipelineConfig) -> Result<(), BuildError> {
    let Some(first) = recipe.steps.first() else {
        return Err(BuildError::InvalidRecipe {
            reason: format!("recipe '{}' has no steps", recipe.family),
        });
    };
    if !first.is_base() {
        return Err(BuildError::InvalidRecipe {
            reason: format!("step '{}' needs a base solid", first.name()),
        });
    }
    if let Some(extra) = recipe.steps[1..].iter().find(|s| s.is_base()) {
        return Err(BuildError::InvalidRecipe {
            reason: format!("step '{}' would start a second base solid", extra.name()),
        });
    }
    let tol = config.selection.profile_merge;
    for step in &recipe.steps {
        match step {
            RecipeStep::Revolve { name, profile, .. } | RecipeStep::ExtrudeCut { name, profile, .. } => {
                check_closed(name, profile, tol)?
            }
            RecipeStep::Extrude {
                name,
                profile,
                holes,
                ..
            } => {
                check_closed(name, profile, tol)?;
                for hole in holes {
                    check_closed(name, hole, tol)?;
                }
            }
            RecipeStep::RadialPattern { name, features, .. } => {
                for feature in features {
                    check_closed(name, &feature.profile, tol)?;
                }
            }
            RecipeStep::Compound { parts, .. } => {
                for (part, _) in parts {
                    validate(part, config)?;
                }
            }
            RecipeStep::Chamfer { .. } | RecipeStep::Fillet { .. } => {}
        }
    }
    Ok(())
}

/// Run every step of `recipe` and return the finished solid.
#[instrument(skip_all, fields(family = %recipe.family, steps = recipe.steps.len()))]
pub fn build(
    kb: &mut dyn KernelBundle,
    recipe: &Recipe,
    config: &PipelineConfig,
) -> Result<BuildOutput, BuildError> {
    validate(recipe, config)?;
    let mut notices = Vec::new();
    let mut current: Option<SolidHandle> = None;
    for step in &recipe.steps {
        let _span = info_span!("step", name = step.name()).entered();
        current = Some(run_step(kb, step, current, config, &mut notices)?);
        debug!("step done");
    }
    let solid = current.ok_or_else(|| BuildError::InvalidRecipe {
        reason: format!("recipe '{}' produced no solid", recipe.family),
    })?;
    info!(faces = kb.list_faces(&solid).len(), edges = kb.list_edges(&solid).len(), "build complete");
    notices.push(Notice::status(format!(
        "built {} in {} steps",
        recipe.family,
        recipe.steps.len()
    )));
    Ok(BuildOutput { solid, notices })
}

fn failed(step: &RecipeStep) -> impl Fn(OpError) -> BuildError + '_ {
    move |source| {
        warn!(step = step.name(), error = %source, "step failed");
        BuildError::StepFailed {
            step: step.name().to_string(),
            source,
        }
    }
}

/// Start the cut `overshoot` before its plane and end it `overshoot` past
/// its far end.
fn through_cut(plane: &SketchPlane, vector: Vec3, overshoot: f64) -> (SketchPlane, Vec3) {
    match vector.normalized() {
        Some(dir) if overshoot > 0.0 => (
            SketchPlane {
                origin: plane.origin - dir * overshoot,
                ..*plane
            },
            vector + dir * (2.0 * overshoot),
        ),
        _ => (*plane, vector),
    }
}

fn base(step: &RecipeStep, current: Option<SolidHandle>) -> Result<SolidHandle, BuildError> {
    current.ok_or_else(|| BuildError::InvalidRecipe {
        reason: format!("step '{}' needs a base solid", step.name()),
    })
}

fn run_step(
    kb: &mut dyn KernelBundle,
    step: &RecipeStep,
    current: Option<SolidHandle>,
    config: &PipelineConfig,
    notices: &mut Vec<Notice>,
) -> Result<SolidHandle, BuildError> {
    match step {
        RecipeStep::Revolve {
            profile,
            plane,
            axis,
            ..
        } => execute_revolve(kb, profile, plane, axis.origin, axis.direction).map_err(failed(step)),
        RecipeStep::Extrude {
            profile,
            holes,
            plane,
            vector,
            ..
        } => execute_extrude(kb, profile, holes, plane, *vector).map_err(failed(step)),
        RecipeStep::ExtrudeCut {
            profile,
            plane,
            vector,
            ..
        } => {
            let target = base(step, current)?;
            let (plane, vector) = through_cut(plane, *vector, config.cut_overshoot);
            let cutter = execute_extrude(kb, profile, &[], &plane, vector).map_err(failed(step))?;
            execute_boolean(kb, target, cutter, BooleanKind::Subtract).map_err(failed(step))
        }
        RecipeStep::Chamfer {
            name,
            selector,
            distance,
        } => {
            let target = base(step, current)?;
            let edges = select_edges(kb.as_introspect(), &target, selector);
            if edges.is_empty() {
                notices.push(Notice::status(format!("{name}: no edges matched")));
            }
            execute_chamfer(kb, target, &edges, *distance).map_err(failed(step))
        }
        RecipeStep::Fillet {
            name,
            selector,
            radius,
        } => {
            let target = base(step, current)?;
            let edges = select_edges(kb.as_introspect(), &target, selector);
            if edges.is_empty() {
                notices.push(Notice::status(format!("{name}: no edges matched")));
            }
            execute_fillet(kb, target, &edges, *radius).map_err(failed(step))
        }
        RecipeStep::RadialPattern {
            features,
            axis,
            count,
            ..
        } => {
            let target = base(step, current)?;
            let solids = features
                .iter()
                .map(|f| execute_extrude(kb, &f.profile, &[], &f.plane, f.vector))
                .collect::<Result<Vec<_>, _>>()
                .map_err(failed(step))?;
            execute_radial_pattern(kb, target, solids, axis.origin, axis.direction, *count)
                .map_err(failed(step))
        }
        RecipeStep::Compound { name, parts } => {
            let mut placed = Vec::with_capacity(parts.len());
            for (part, placement) in parts {
                let output = build(kb, part, config).map_err(|e| match e {
                    BuildError::StepFailed { step, source } => BuildError::StepFailed {
                        step: format!("{name}/{step}"),
                        source,
                    },
                    other => other,
                })?;
                notices.extend(output.notices);
                placed.push(kb.transformed(output.solid, placement).map_err(|e| failed(step)(e.into()))?);
            }
            kb.make_compound(placed).map_err(|e| failed(step)(e.into()))
        }
    }
}
