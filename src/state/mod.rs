// State module - Run totals and lifecycle event payloads

pub mod result;

pub use result::{AssertionInfo, AssertionResult, AssertionStats, MessageInfo, ResultWas};

use serde::Serialize;
use std::time::Duration;

/// Pass/fail counters for one category (assertions or test cases)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub failed_but_ok: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.failed_but_ok
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.failed_but_ok == 0
    }

    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }

    fn minus(&self, other: &Counts) -> Counts {
        Counts {
            passed: self.passed.saturating_sub(other.passed),
            failed: self.failed.saturating_sub(other.failed),
            failed_but_ok: self.failed_but_ok.saturating_sub(other.failed_but_ok),
        }
    }
}

/// Aggregated counters for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub assertions: Counts,
    pub test_cases: Counts,
}

impl Totals {
    /// Record one assertion outcome. Info and warning results are not counted.
    pub fn record(&mut self, result: &AssertionResult) {
        match result.result_type {
            ResultWas::Ok => self.assertions.passed += 1,
            ResultWas::Info | ResultWas::Warning => {}
            _ if result.ok_to_fail => self.assertions.failed_but_ok += 1,
            _ => self.assertions.failed += 1,
        }
    }

    /// Counters accumulated since `prev`, with the test case itself classified
    pub fn delta(&self, prev: &Totals) -> Totals {
        let assertions = self.assertions.minus(&prev.assertions);
        let mut test_cases = Counts::default();
        if assertions.failed > 0 {
            test_cases.failed = 1;
        } else if assertions.failed_but_ok > 0 {
            test_cases.failed_but_ok = 1;
        } else {
            test_cases.passed = 1;
        }

        Totals {
            assertions,
            test_cases,
        }
    }

    pub fn add_test_case(&mut self, delta: &Totals) {
        self.test_cases.passed += delta.test_cases.passed;
        self.test_cases.failed += delta.test_cases.failed;
        self.test_cases.failed_but_ok += delta.test_cases.failed_but_ok;
    }
}

/// Identity of a registered test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseInfo {
    pub name: String,
    pub tags: Vec<String>,
}

impl TestCaseInfo {
    /// Tags are stored lower-cased, without brackets
    pub fn new<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut info = Self {
            name: name.into(),
            tags: Vec::new(),
        };
        for tag in tags {
            info.add_tag(tag.as_ref());
        }
        info
    }

    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim_start_matches('[').trim_end_matches(']').to_lowercase();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Tags rendered as `[a][b]`
    pub fn tags_as_string(&self) -> String {
        self.tags.iter().map(|t| format!("[{}]", t)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunInfo {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TestCaseStats {
    pub info: TestCaseInfo,
    pub totals: Totals,
    pub duration: Duration,
    pub aborting: bool,
}

#[derive(Debug, Clone)]
pub struct TestRunStats {
    pub run_info: TestRunInfo,
    pub totals: Totals,
    pub aborting: bool,
}
