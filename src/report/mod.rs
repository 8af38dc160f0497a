// Report module - Reporter contract and built-in reporters

pub mod colour;
pub mod multi;
pub mod registry;
pub mod streaming;
pub mod tap;

use anyhow::Result;

use crate::config::{RunConfiguration, ShowDurations};
use crate::output::StreamWriter;
use crate::state::{
    AssertionInfo, AssertionStats, TestCaseInfo, TestCaseStats, TestRunInfo, TestRunStats,
};

pub use colour::Painter;
pub use multi::MultiReporter;
pub use registry::{ReporterFactory, ReporterRegistry};
pub use streaming::StreamingJsonReporter;
pub use tap::{TapPlan, TapReporter};

/// Capabilities a reporter asks of the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReporterPreferences {
    /// Route the test's own stdout capture to the reporter
    pub should_redirect_std_out: bool,
}

/// Settings handed to a reporter when it is created
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub stream: StreamWriter,
    pub colour: bool,
    pub show_durations: ShowDurations,
    pub include_successful: bool,
    pub run_name: String,
}

impl ReporterConfig {
    pub fn new(stream: StreamWriter) -> Self {
        Self {
            stream,
            colour: false,
            show_durations: ShowDurations::default(),
            include_successful: false,
            run_name: String::new(),
        }
    }

    pub fn from_run(config: &RunConfiguration) -> Self {
        Self {
            stream: config.stream().underlying_stream(),
            colour: config.colour_enabled(),
            show_durations: config.show_durations(),
            include_successful: config.include_successful_results(),
            run_name: config.name().to_string(),
        }
    }
}

/// Lifecycle listener driven by the test executor.
///
/// Calls arrive on one thread in the order
/// run -> [case -> [assertion_starting -> assertion_ended]*]* -> run end.
pub trait Reporter: Send {
    fn preferences(&self) -> ReporterPreferences {
        ReporterPreferences::default()
    }

    /// A filter selected nothing; never fatal
    fn no_matching_test_cases(&mut self, spec: &str);

    fn test_run_starting(&mut self, _run_info: &TestRunInfo) {}

    fn test_case_starting(&mut self, _test_info: &TestCaseInfo) {}

    fn assertion_starting(&mut self, _info: &AssertionInfo) {}

    /// Returns whether the executor should keep evaluating the current expression chain
    fn assertion_ended(&mut self, stats: &AssertionStats) -> bool;

    fn test_case_ended(&mut self, _stats: &TestCaseStats) {}

    /// Final event; all buffered output must be flushed before returning
    fn test_run_ended(&mut self, stats: &TestRunStats) -> Result<()>;
}
