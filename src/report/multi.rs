// Fan-out reporter for runs that name several reporters

use anyhow::Result;

use super::{Reporter, ReporterPreferences};
use crate::state::{
    AssertionInfo, AssertionStats, TestCaseInfo, TestCaseStats, TestRunInfo, TestRunStats,
};

/// Forwards every event to each child in registration order
#[derive(Default)]
pub struct MultiReporter {
    reporters: Vec<Box<dyn Reporter>>,
}

impl MultiReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Reporter for MultiReporter {
    fn preferences(&self) -> ReporterPreferences {
        ReporterPreferences {
            should_redirect_std_out: self
                .reporters
                .iter()
                .any(|r| r.preferences().should_redirect_std_out),
        }
    }

    fn no_matching_test_cases(&mut self, spec: &str) {
        for reporter in &mut self.reporters {
            reporter.no_matching_test_cases(spec);
        }
    }

    fn test_run_starting(&mut self, run_info: &TestRunInfo) {
        for reporter in &mut self.reporters {
            reporter.test_run_starting(run_info);
        }
    }

    fn test_case_starting(&mut self, test_info: &TestCaseInfo) {
        for reporter in &mut self.reporters {
            reporter.test_case_starting(test_info);
        }
    }

    fn assertion_starting(&mut self, info: &AssertionInfo) {
        for reporter in &mut self.reporters {
            reporter.assertion_starting(info);
        }
    }

    fn assertion_ended(&mut self, stats: &AssertionStats) -> bool {
        // every child sees the assertion, even after one asks to stop
        self.reporters
            .iter_mut()
            .fold(true, |keep_going, r| r.assertion_ended(stats) && keep_going)
    }

    fn test_case_ended(&mut self, stats: &TestCaseStats) {
        for reporter in &mut self.reporters {
            reporter.test_case_ended(stats);
        }
    }

    fn test_run_ended(&mut self, stats: &TestRunStats) -> Result<()> {
        let mut first_error = None;
        for reporter in &mut self.reporters {
            if let Err(e) = reporter.test_run_ended(stats) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
