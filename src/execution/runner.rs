// Test runner
// Drives selected test cases through the reporter lifecycle

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::AssertionContext;
use crate::config::{RunConfiguration, RunOrder};
use crate::report::Reporter;
use crate::state::{TestCaseInfo, TestCaseStats, TestRunInfo, TestRunStats, Totals};

/// Body of a test case
pub trait TestInvoker {
    fn invoke(&self, ctx: &mut AssertionContext<'_>);
}

impl<F> TestInvoker for F
where
    F: Fn(&mut AssertionContext<'_>),
{
    fn invoke(&self, ctx: &mut AssertionContext<'_>) {
        self(ctx)
    }
}

/// A registered test case
pub struct TestCase {
    pub info: TestCaseInfo,
    invoker: Box<dyn TestInvoker>,
}

impl TestCase {
    pub fn new(info: TestCaseInfo, invoker: impl TestInvoker + 'static) -> Self {
        Self {
            info,
            invoker: Box::new(invoker),
        }
    }

    pub fn from_fn<F>(info: TestCaseInfo, body: F) -> Self
    where
        F: Fn(&mut AssertionContext<'_>) + 'static,
    {
        Self::new(info, body)
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase").field("info", &self.info).finish()
    }
}

/// What a finished run tells the process about success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub totals: Totals,
    pub unmatched_filters: Vec<String>,
    pub aborted: bool,
    allow_no_match: bool,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }

    /// Failed assertions (capped at 255), else 1 for an unmatched filter, else 0
    pub fn exit_code(&self) -> i32 {
        let failed = self.totals.assertions.failed;
        if failed > 0 {
            failed.min(255) as i32
        } else if !self.unmatched_filters.is_empty() && !self.allow_no_match {
            1
        } else {
            0
        }
    }
}

/// Test runner
pub struct TestRunner<'a> {
    config: &'a RunConfiguration,
}

impl<'a> TestRunner<'a> {
    pub fn new(config: &'a RunConfiguration) -> Self {
        Self { config }
    }

    /// Tests selected by the filters, in the configured order
    pub fn select<'t>(&self, tests: &'t [TestCase]) -> Vec<&'t TestCase> {
        let spec = self.config.test_spec();
        let mut selected: Vec<&TestCase> = tests.iter().filter(|t| spec.matches(&t.info)).collect();

        match self.config.run_order() {
            RunOrder::Declared => {}
            RunOrder::Lexicographic => selected.sort_by(|a, b| a.info.name.cmp(&b.info.name)),
            RunOrder::Random => {
                let mut rng = StdRng::seed_from_u64(u64::from(self.config.rng_seed()));
                selected.shuffle(&mut rng);
            }
        }

        selected
    }

    /// Source text of every filter that matches none of `tests`
    pub fn unmatched_filters(&self, tests: &[TestCase]) -> Vec<String> {
        self.config
            .test_spec()
            .filters()
            .iter()
            .filter(|f| !tests.iter().any(|t| f.matches(&t.info)))
            .map(|f| f.source().to_string())
            .collect()
    }

    fn is_aborting(&self, totals: &Totals) -> bool {
        self.config
            .abort_after()
            .is_some_and(|limit| totals.assertions.failed >= limit as usize)
    }

    pub fn run(&self, tests: &[TestCase], reporter: &mut dyn Reporter) -> Result<RunOutcome> {
        let run_info = TestRunInfo {
            name: self.config.name().to_string(),
        };
        info!("Starting test run '{}'", run_info.name);
        reporter.test_run_starting(&run_info);

        let unmatched_filters = self.unmatched_filters(tests);
        for filter in &unmatched_filters {
            warn!("No test cases matched '{}'", filter);
            reporter.no_matching_test_cases(filter);
        }

        let selected = self.select(tests);
        debug!("{} of {} test case(s) selected", selected.len(), tests.len());

        let mut totals = Totals::default();
        for test in selected {
            if self.is_aborting(&totals) {
                info!("Abort threshold reached; skipping remaining test cases");
                break;
            }
            self.run_test_case(test, reporter, &mut totals);
        }

        let aborting = self.is_aborting(&totals);
        info!(
            "Test run finished: {} assertion(s) passed, {} failed",
            totals.assertions.passed, totals.assertions.failed
        );
        reporter.test_run_ended(&TestRunStats {
            run_info,
            totals,
            aborting,
        })?;

        Ok(RunOutcome {
            totals,
            unmatched_filters,
            aborted: aborting,
            allow_no_match: self.config.allow_no_match(),
        })
    }

    fn run_test_case(&self, test: &TestCase, reporter: &mut dyn Reporter, totals: &mut Totals) {
        reporter.test_case_starting(&test.info);
        let before = *totals;
        let start = Instant::now();

        {
            let mut ctx = AssertionContext::new(&mut *reporter, self.config, &test.info, totals);
            test.invoker.invoke(&mut ctx);
        }

        if self.config.warn_about_missing_assertions()
            && totals.assertions.total() == before.assertions.total()
        {
            warn!("No assertions in test case '{}'", test.info.name);
            totals.assertions.failed += 1;
        }

        let delta = totals.delta(&before);
        totals.add_test_case(&delta);

        reporter.test_case_ended(&TestCaseStats {
            info: test.info.clone(),
            totals: delta,
            duration: start.elapsed(),
            aborting: self.is_aborting(totals),
        });
    }
}
