use anyhow::{Context, Result};
use serde_json::json;
use std::io::Write;
use tracing::warn;

use super::{Reporter, ReporterConfig};
use crate::config::ShowDurations;
use crate::output::StreamWriter;
use crate::state::{AssertionStats, TestCaseInfo, TestCaseStats, TestRunInfo, TestRunStats};

/// Emits one JSON object per lifecycle event
pub struct StreamingJsonReporter {
    stream: StreamWriter,
    include_successful: bool,
    show_durations: bool,
    run_name: String,
}

impl StreamingJsonReporter {
    pub const NAME: &'static str = "jsonl";

    pub fn new(config: &ReporterConfig) -> Self {
        Self {
            stream: config.stream.clone(),
            include_successful: config.include_successful,
            show_durations: config.show_durations == ShowDurations::Always,
            run_name: config.run_name.clone(),
        }
    }

    pub fn description() -> &'static str {
        "Streams lifecycle events as JSON lines, for IDE integration"
    }

    fn emit(&mut self, event: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string(event)
            && let Err(e) = writeln!(self.stream, "{}", s)
        {
            warn!("Failed to write JSON event: {}", e);
        }
    }
}

impl Reporter for StreamingJsonReporter {
    fn no_matching_test_cases(&mut self, spec: &str) {
        self.emit(&json!({
            "event": "no_match",
            "filter": spec,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn test_run_starting(&mut self, run_info: &TestRunInfo) {
        let name = if run_info.name.is_empty() {
            self.run_name.clone()
        } else {
            run_info.name.clone()
        };
        self.emit(&json!({
            "event": "run_start",
            "name": name,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn test_case_starting(&mut self, test_info: &TestCaseInfo) {
        self.emit(&json!({
            "event": "test_start",
            "testId": test_info.name,
            "tags": test_info.tags,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn assertion_ended(&mut self, stats: &AssertionStats) -> bool {
        let result = &stats.result;
        if result.is_ok() && !self.include_successful {
            return true;
        }

        let mut event = json!({
            "event": "assertion",
            "testId": stats.test_case_name,
            "result": result.result_type,
            "ok": result.is_ok(),
        });
        if let Some(expr) = &result.expression {
            event["expression"] = json!(expr);
        }
        if let Some(expanded) = &result.expanded {
            event["expanded"] = json!(expanded);
        }
        if !stats.messages.is_empty() {
            event["messages"] = json!(stats.messages);
        }

        self.emit(&event);
        true
    }

    fn test_case_ended(&mut self, stats: &TestCaseStats) {
        let event_type = if stats.totals.assertions.failed > 0 {
            "test_fail"
        } else {
            "test_pass"
        };

        let mut event = json!({
            "event": event_type,
            "testId": stats.info.name,
            "assertions": stats.totals.assertions,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if self.show_durations {
            event["duration"] = json!(stats.duration.as_millis() as u64);
        }

        self.emit(&event);
    }

    fn test_run_ended(&mut self, stats: &TestRunStats) -> Result<()> {
        self.emit(&json!({
            "event": "run_end",
            "summary": {
                "assertions": stats.totals.assertions,
                "testCases": stats.totals.test_cases,
                "aborted": stats.aborting
            },
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));

        self.stream.flush().context("Failed to flush JSON event stream")?;
        Ok(())
    }
}
