use std::sync::Arc;

use part_catalog::Variant;
use part_engine::{Bushing, JawCouplingHalf};
use test_harness::PartScenario;

#[test]
fn successful_report_lists_everything() {
    let outcome = PartScenario::new(Arc::new(Bushing::default())).row(1).run();
    let report = outcome.report();
    assert!(report.passed());
    let text = report.to_text();
    assert!(text.starts_with("=== Part Report: bushing ==="));
    assert!(text.contains("Selection: row 1, variant 1"));
    assert!(text.contains("Dimensions (4):"));
    assert!(text.contains("Bounding Box:"));
    assert!(text.contains("Oracle Results (6 checks):"));
    assert!(!text.contains("[FAIL]"));
    assert!(text.ends_with("Errors: none\n"));
}

#[test]
fn failed_report_names_the_error() {
    let outcome = PartScenario::new(Arc::new(Bushing::default()))
        .row(4)
        .variant(Variant::First)
        .run();
    let report = outcome.report();
    assert!(!report.passed());
    assert_eq!(report.triangle_count, 0);
    assert!(report.bounding_box.is_none());
    let text = format!("{report}");
    assert!(text.contains("Error: "));
    assert!(text.contains("missing"));
}

#[test]
fn unconfigured_scenario_reports_no_selection() {
    let report = PartScenario::new(Arc::new(JawCouplingHalf::default())).run().report();
    assert!(report.to_text().contains("Selection: none"));
    assert!(report.error.is_some());
}

#[test]
fn warnings_show_in_notices() {
    let report = PartScenario::new(Arc::new(JawCouplingHalf::default()))
        .row(2)
        .run()
        .report();
    assert!(report.to_text().contains("[Warning] preferred value unavailable"));
}
