// Run command - replay a recorded suite through the configured reporters

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::RunConfiguration;
use crate::execution::{RecordedSuite, ReplayOptions, RunOutcome, TestCase, TestRunner};
use crate::report::ReporterRegistry;

/// Load test cases from a suite file, or none when no suite is given
pub fn load_test_cases(config: &RunConfiguration, suite: Option<&Path>) -> Result<Vec<TestCase>> {
    match suite {
        Some(path) => {
            let options = ReplayOptions::for_run(config, path);
            Ok(RecordedSuite::load(path)?.into_test_cases(&options))
        }
        None => Ok(Vec::new()),
    }
}

pub fn run_tests(
    config: &RunConfiguration,
    registry: &ReporterRegistry,
    tests: &[TestCase],
) -> Result<RunOutcome> {
    let mut reporter = registry.create_for_run(config)?;
    info!("Reporting with: {}", config.reporter_names().join(", "));

    let outcome = TestRunner::new(config).run(tests, reporter.as_mut())?;
    if outcome.aborted {
        info!("Run aborted after {} failed assertion(s)", outcome.totals.assertions.failed);
    }
    Ok(outcome)
}
