//! Test harness for the part pipeline.
//!
//! Scripts whole selections through the pipeline and checks the resulting
//! meshes with oracles that report verdicts instead of panicking.
//!
//! # Key Components
//!
//! - [`PartScenario`]: fluent runner for one family and selection
//! - [`oracle`]: mesh checks returning pass/fail verdicts
//! - [`report`]: plain-text summaries of a scenario
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::PartReport;
pub use workflow::{PartScenario, ScenarioOutcome};
