// Per-test-case assertion sink handed to test bodies

use tracing::{debug, warn};

use crate::config::RunConfiguration;
use crate::output::is_debugger_present;
use crate::report::Reporter;
use crate::state::{
    AssertionInfo, AssertionResult, AssertionStats, MessageInfo, ResultWas, TestCaseInfo, Totals,
};

/// Receives the assertions of one running test case and forwards them to the reporter
pub struct AssertionContext<'a> {
    reporter: &'a mut dyn Reporter,
    config: &'a RunConfiguration,
    test_case: &'a TestCaseInfo,
    totals: &'a mut Totals,
    pending_messages: Vec<MessageInfo>,
}

impl<'a> AssertionContext<'a> {
    pub(crate) fn new(
        reporter: &'a mut dyn Reporter,
        config: &'a RunConfiguration,
        test_case: &'a TestCaseInfo,
        totals: &'a mut Totals,
    ) -> Self {
        Self {
            reporter,
            config,
            test_case,
            totals,
            pending_messages: Vec::new(),
        }
    }

    pub fn test_case(&self) -> &TestCaseInfo {
        self.test_case
    }

    /// Attach a message to the next assertion
    pub fn info(&mut self, text: impl Into<String>) {
        self.pending_messages.push(MessageInfo::info(text));
    }

    pub fn attach(&mut self, message: MessageInfo) {
        self.pending_messages.push(message);
    }

    /// Report a warning; it carries any pending messages after its own text
    pub fn warn(&mut self, text: impl Into<String>) -> bool {
        self.pending_messages.insert(0, MessageInfo::warning(text));
        self.assert(AssertionResult::new(ResultWas::Warning))
    }

    /// Report a failure that has no expression
    pub fn fail(&mut self, text: impl Into<String>) -> bool {
        self.info(text);
        self.assert(AssertionResult::new(ResultWas::ExplicitFailure))
    }

    /// Whether assertions recorded under `path` are selected by `--section`
    pub fn section_enabled(&self, path: &[String]) -> bool {
        self.config
            .sections_to_run()
            .iter()
            .zip(path)
            .all(|(wanted, actual)| wanted == actual)
    }

    pub fn allow_throws(&self) -> bool {
        self.config.allow_throws()
    }

    /// Record an evaluated assertion.
    ///
    /// Returns the reporter's answer to whether evaluation should continue.
    pub fn assert(&mut self, result: AssertionResult) -> bool {
        self.reporter.assertion_starting(&AssertionInfo {
            test_case_name: self.test_case.name.clone(),
            expression: result.expression.clone(),
        });

        if result.result_type.is_internal() {
            warn!(
                "Internal result marker {:?} reported by '{}'",
                result.result_type, self.test_case.name
            );
        }

        self.totals.record(&result);
        let failed = !result.is_ok();

        let stats = AssertionStats {
            result,
            messages: std::mem::take(&mut self.pending_messages),
            test_case_name: self.test_case.name.clone(),
            totals: *self.totals,
        };
        let keep_going = self.reporter.assertion_ended(&stats);

        if failed && self.config.should_debug_break() && is_debugger_present() {
            debug!(
                target: "tapline::break",
                test = %self.test_case.name,
                "Assertion failed with debugger attached"
            );
        }

        keep_going
    }
}
