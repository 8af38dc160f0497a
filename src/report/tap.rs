// TAP reporter - one line per assertion, plan line at the end

use anyhow::{Context, Result};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use super::{Painter, Reporter, ReporterConfig, ReporterPreferences};
use crate::output::StreamWriter;
use crate::state::{AssertionStats, MessageInfo, ResultWas, TestRunStats};

const PASSED: &str = "ok";
const FAILED: &str = "not ok";
const SKIPPED_PLAN: &str = "1..0 # Skipped: No tests ran.";

/// Trailing plan line of a TAP stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapPlan {
    NoTestsRan,
    Tests(usize),
}

impl fmt::Display for TapPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapPlan::NoTestsRan => f.write_str(SKIPPED_PLAN),
            TapPlan::Tests(n) => write!(f, "1..{}", n),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a TAP plan line: '{0}'")]
pub struct InvalidPlan(pub String);

impl FromStr for TapPlan {
    type Err = InvalidPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end();
        if line == SKIPPED_PLAN {
            return Ok(TapPlan::NoTestsRan);
        }
        line.strip_prefix("1..")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse::<usize>().ok())
            .map(TapPlan::Tests)
            .ok_or_else(|| InvalidPlan(s.to_string()))
    }
}

/// "1 message", "2 messages"
pub fn pluralise(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Render quoted messages joined by " and "
pub fn join_messages(messages: &[MessageInfo], painter: &Painter) -> String {
    messages
        .iter()
        .map(|m| format!(" '{}'", m.text))
        .collect::<Vec<_>>()
        .join(&painter.dim(" and"))
}

/// Builds the text of one assertion line (without the test-case suffix)
struct AssertionLine<'a> {
    stats: &'a AssertionStats,
    counter: usize,
    painter: &'a Painter,
    out: String,
}

impl<'a> AssertionLine<'a> {
    fn new(stats: &'a AssertionStats, counter: usize, painter: &'a Painter) -> Self {
        Self {
            stats,
            counter,
            painter,
            out: String::new(),
        }
    }

    fn render(mut self) -> String {
        let stats = self.stats;
        let result = &stats.result;
        let messages = stats.messages.as_slice();

        match result.result_type {
            ResultWas::Ok => {
                self.result_type(PASSED);
                self.original_expression();
                self.reconstructed_expression();
                self.remaining_messages(messages, result.has_expression(), true);
            }
            ResultWas::ExpressionFailed => {
                self.result_type(if result.is_ok() { PASSED } else { FAILED });
                self.original_expression();
                self.reconstructed_expression();
                if result.is_ok() {
                    self.issue("# TODO");
                }
                self.remaining_messages(messages, true, true);
            }
            ResultWas::ThrewException => {
                self.result_type(FAILED);
                self.issue("unexpected exception with message:");
                let rest = self.first_message(messages);
                self.expression_was();
                self.remaining_messages(rest, true, true);
            }
            ResultWas::FatalErrorCondition => {
                self.result_type(FAILED);
                self.issue("fatal error condition with message:");
                let rest = self.first_message(messages);
                self.expression_was();
                self.remaining_messages(rest, true, true);
            }
            ResultWas::DidntThrowException => {
                self.result_type(FAILED);
                self.issue("expected exception, got none");
                self.expression_was();
                self.remaining_messages(messages, true, true);
            }
            ResultWas::Info => {
                self.out.push_str("info");
                let rest = self.first_message(messages);
                self.remaining_messages(rest, true, true);
            }
            ResultWas::Warning => {
                self.out.push_str("warning");
                let rest = self.first_message(messages);
                self.remaining_messages(rest, true, true);
            }
            ResultWas::ExplicitFailure => {
                self.result_type(FAILED);
                self.issue("explicitly");
                self.remaining_messages(messages, true, false);
            }
            ResultWas::Unknown | ResultWas::FailureBit | ResultWas::Exception => {
                self.out.push_str("** internal error **");
            }
        }

        self.out
    }

    fn result_type(&mut self, pass_or_fail: &str) {
        self.out
            .push_str(&format!("{} {} -", pass_or_fail, self.counter));
    }

    fn issue(&mut self, issue: &str) {
        self.out.push(' ');
        self.out.push_str(issue);
    }

    fn original_expression(&mut self) {
        let stats = self.stats;
        let result = &stats.result;
        if result.has_expression() {
            self.out.push(' ');
            self.out.push_str(result.expression.as_deref().unwrap_or_default());
        }
    }

    fn reconstructed_expression(&mut self) {
        let stats = self.stats;
        let result = &stats.result;
        if result.has_expanded_expression() {
            let expanded = result.expanded.as_deref().unwrap_or_default();
            self.out.push_str(&self.painter.dim(" for: "));
            self.out.push_str(&expanded.replace('\n', " "));
        }
    }

    fn expression_was(&mut self) {
        if self.stats.result.has_expression() {
            self.out.push(';');
            self.out.push_str(&self.painter.dim(" expression was:"));
            self.original_expression();
        }
    }

    /// Writes the first message and returns the ones still to print
    fn first_message<'m>(&mut self, messages: &'m [MessageInfo]) -> &'m [MessageInfo] {
        match messages.split_first() {
            Some((first, rest)) => {
                self.out.push_str(&format!(" '{}'", first.text));
                rest
            }
            None => messages,
        }
    }

    fn remaining_messages(&mut self, messages: &[MessageInfo], preamble: bool, dim: bool) {
        if messages.is_empty() {
            return;
        }

        if preamble {
            let text = format!(" with {}:", pluralise(messages.len(), "message"));
            if dim {
                self.out.push_str(&self.painter.dim(&text));
            } else {
                self.out.push_str(&text);
            }
        }
        self.out.push_str(&join_messages(messages, self.painter));
    }
}

/// Render one assertion in the line protocol, without the trailing test name
pub fn render_assertion(stats: &AssertionStats, counter: usize, painter: &Painter) -> String {
    AssertionLine::new(stats, counter, painter).render()
}

/// TAP reporter
pub struct TapReporter {
    stream: StreamWriter,
    painter: Painter,
    counter: usize,
}

impl TapReporter {
    pub const NAME: &'static str = "tap";

    pub fn new(config: &ReporterConfig) -> Self {
        Self {
            stream: config.stream.clone(),
            painter: Painter::new(config.colour),
            counter: 0,
        }
    }

    pub fn description() -> &'static str {
        "Reports test results in TAP format, suitable for test harnesses"
    }

    /// Assertions seen so far
    pub fn counter(&self) -> usize {
        self.counter
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.stream.write_all(text.as_bytes()) {
            warn!("Failed to write TAP output: {}", e);
        }
    }
}

impl Reporter for TapReporter {
    fn preferences(&self) -> ReporterPreferences {
        ReporterPreferences {
            should_redirect_std_out: false,
        }
    }

    fn no_matching_test_cases(&mut self, spec: &str) {
        self.emit(&format!("# No test cases matched '{}'\n", spec));
    }

    fn assertion_ended(&mut self, stats: &AssertionStats) -> bool {
        self.counter += 1;
        let line = render_assertion(stats, self.counter, &self.painter);
        self.emit(&format!("{} # {}\n", line, stats.test_case_name));
        true
    }

    fn test_run_ended(&mut self, stats: &TestRunStats) -> Result<()> {
        let plan = if stats.totals.test_cases.total() == 0 {
            TapPlan::NoTestsRan
        } else {
            TapPlan::Tests(self.counter)
        };

        writeln!(self.stream, "{}\n", plan).context("Failed to write TAP plan line")?;
        self.stream.flush().context("Failed to flush TAP output")?;
        Ok(())
    }
}
