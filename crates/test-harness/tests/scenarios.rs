use std::sync::Arc;
use std::time::Duration;

use file_format::{export_binary_stl, import_ascii_stl, import_binary_stl};
use part_catalog::{ConfigurationError, Dim, SelectionState, Variant};
use part_engine::*;
use part_geom::{BoundingBox, Point3d};
use shape_kernel::{KernelCall, ReferenceKernel};
use test_harness::assertions::*;
use test_harness::helpers::every_selection;
use test_harness::PartScenario;

fn missing_dimension(e: &PipelineError) -> bool {
    matches!(
        e,
        PipelineError::Configuration(ConfigurationError::MissingDimension { .. })
    )
}

// ── Whole catalogs ──────────────────────────────────────────────────────────

#[test]
fn every_family_passes_mesh_oracles_on_every_buildable_row() {
    for family in builtin_families() {
        for selection in every_selection(family.as_ref()) {
            let outcome = PartScenario::new(family.clone()).selection(selection).run();
            let skip = matches!(
                (family.name(), selection.row, selection.variant),
                ("jaw coupling half", Some(6), _) | ("bushing", Some(4), Variant::First)
            );
            if skip {
                outcome.assert_failed(missing_dimension).unwrap();
            } else {
                outcome
                    .assert_ok()
                    .unwrap_or_else(|e| panic!("{e}\n{}", outcome.report()));
            }
        }
    }
}

// ── Geometry ────────────────────────────────────────────────────────────────

#[test]
fn bushing_fills_its_envelope() {
    let config = PipelineConfig::coarse();
    let mut outcome = PartScenario::new(Arc::new(Bushing::default()))
        .row(0)
        .config(config)
        .run();
    let tol = config.triangulation_tolerance + 1e-3;
    outcome.check_bounding_box(
        BoundingBox::new(Point3d::new(0.0, -8.0, -8.0), Point3d::new(10.0, 8.0, 8.0)),
        tol,
    );
    outcome.assert_ok().unwrap();
    assert_eq!(outcome.count_calls(|c| matches!(c, KernelCall::Revolve { .. })), 1);
}

#[test]
fn jaws_stand_off_the_flange() {
    // Flush keyway cuts: the reference backend keeps the cutter's side faces.
    let config = PipelineConfig {
        cut_overshoot: 0.0,
        ..PipelineConfig::coarse()
    };
    let outcome = PartScenario::new(Arc::new(JawCouplingHalf::default()))
        .row(1)
        .variant(Variant::Second)
        .config(config)
        .run();
    let output = outcome.assert_ok().unwrap();
    let tol = config.triangulation_tolerance + 1e-3;
    assert_bounding_box(&output.mesh, [-10.0, -26.5, -26.5], [25.0, 26.5, 26.5], tol, "jaw row 1").unwrap();
}

#[test]
fn sprocket_plate_is_as_wide_as_the_variant() {
    for (variant, width) in [(Variant::First, 7.2), (Variant::Second, 5.4)] {
        let outcome = PartScenario::new(Arc::new(Sprocket::default()))
            .row(0)
            .variant(variant)
            .run();
        let output = outcome.assert_ok().unwrap();
        let bb = output.mesh.bounding_box();
        assert!(bb.min.z.abs() < 1e-4);
        assert_eq!(output.dimensions.get(Dim::Width), Ok(width));
        assert!((bb.max.z - width).abs() < 1e-4);
        let tip_r = output.dimensions.get(Dim::TipDiameter).unwrap() / 2.0;
        assert!(bb.max.x <= tip_r + 1e-4 && bb.max.y <= tip_r + 1e-4);
    }
}

#[test]
fn finer_tolerance_never_loses_triangles() {
    let coarse = PartScenario::new(Arc::new(CouplingHalf::default()))
        .row(2)
        .config(PipelineConfig::coarse())
        .run();
    let fine = PartScenario::new(Arc::new(CouplingHalf::default()))
        .row(2)
        .config(PipelineConfig::default())
        .run();
    let (c, f) = (coarse.assert_ok().unwrap(), fine.assert_ok().unwrap());
    assert!(f.mesh.triangle_count() > c.mesh.triangle_count());
    let (ca, fa) = (c.mesh.surface_area(), f.mesh.surface_area());
    assert!((ca - fa).abs() / fa < 0.05, "coarse {ca} fine {fa}");
}

// ── Kernel call shape ───────────────────────────────────────────────────────

#[test]
fn jaw_recipe_calls() {
    for (row, count) in [(0usize, 2usize), (3, 2), (4, 3), (5, 3)] {
        let outcome = PartScenario::new(Arc::new(JawCouplingHalf::default()))
            .row(row)
            .without_oracles()
            .run();
        outcome.output().unwrap();
        assert_eq!(outcome.union_count(), 2 * count, "row {row}");
        assert_eq!(outcome.count_calls(|c| matches!(c, KernelCall::Difference)), 1);
        assert_eq!(outcome.count_calls(|c| matches!(c, KernelCall::Chamfer { .. })), 2);
        assert_eq!(
            outcome.count_calls(|c| matches!(c, KernelCall::Fillet { edges: 2, .. })),
            1,
            "row {row}"
        );
    }
}

#[test]
fn pair_is_one_compound_of_two_halves() {
    let outcome = PartScenario::new(Arc::new(CouplingPair::default())).row(3).run();
    outcome.assert_ok().unwrap();
    assert_eq!(outcome.count_calls(|c| matches!(c, KernelCall::Compound { parts: 2 })), 1);
    assert_eq!(outcome.count_calls(|c| matches!(c, KernelCall::Difference)), 2);
    assert_eq!(outcome.union_count(), 0);
}

// ── Notices ─────────────────────────────────────────────────────────────────

#[test]
fn fallback_warning_reaches_the_output() {
    let outcome = PartScenario::new(Arc::new(JawCouplingHalf::default())).row(2).run();
    let output = outcome.assert_ok().unwrap();
    assert_notice(&output.notices, "falling back", "jaw row 2").unwrap();
    assert_notice(&output.notices, "triangles", "jaw row 2").unwrap();
}

// ── Session, worker and interchange together ───────────────────────────────

#[test]
fn session_mesh_exports_and_reads_back() {
    let mut session: PartSession<ReferenceKernel> = PartSession::new(Arc::new(Sprocket::default()), PipelineConfig::coarse());
    session.begin_edit(true);
    session.set_row(2).unwrap();
    session.set_variant(Variant::Second).unwrap();
    session.commit().unwrap();
    assert!(!session.mesh().is_empty());

    let bytes = export_binary_stl(session.mesh(), "sprocket").unwrap();
    assert_eq!(&import_binary_stl(&bytes).unwrap().mesh, session.mesh());
    let text = file_format::export_ascii_stl(session.mesh(), "sprocket");
    assert_eq!(&import_ascii_stl(&text).unwrap().mesh, session.mesh());
}

#[test]
fn worker_result_matches_a_direct_run() {
    let family: Arc<dyn PartFamily> = Arc::new(CouplingHalf::default());
    let worker = BuildWorker::spawn_on::<ReferenceKernel>(family.clone(), PipelineConfig::coarse()).unwrap();
    let selection = SelectionState::configured(1, Variant::Second);
    worker.submit(selection);
    let done = worker.recv_timeout(Duration::from_secs(60)).expect("worker finished");
    let direct = run_pipeline_on::<ReferenceKernel>(family.as_ref(), &selection, &PipelineConfig::coarse()).unwrap();
    assert_eq!(done.result.unwrap().mesh, direct.mesh);
}
