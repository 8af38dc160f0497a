// Recorded suites: JSON files of test cases and their captured assertions

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{AssertionContext, TestCase, TestInvoker};
use crate::config::RunConfiguration;
use crate::state::{AssertionResult, MessageInfo, ResultWas, TestCaseInfo};

/// Contents of a suite file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSuite {
    #[serde(default)]
    pub tests: Vec<RecordedTest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTest {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assertions: Vec<RecordedAssertion>,
}

/// One captured assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAssertion {
    #[serde(default = "default_result")]
    pub result: ResultWas,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub expanded: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageInfo>,
    #[serde(default)]
    pub ok_to_fail: bool,
    /// A failure ends the test case
    #[serde(default)]
    pub required: bool,
    /// Section path the assertion was recorded under
    #[serde(default)]
    pub section: Vec<String>,
    /// Assertion only exists to check that something throws
    #[serde(default)]
    pub throws_check: bool,
}

fn default_result() -> ResultWas {
    ResultWas::Ok
}

/// How recorded tests are turned into runnable cases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOptions {
    pub file_tag: Option<String>,
    pub show_invisibles: bool,
}

impl ReplayOptions {
    pub fn for_run(config: &RunConfiguration, suite_path: &Path) -> Self {
        let file_tag = if config.filenames_as_tags() {
            suite_path
                .file_stem()
                .map(|stem| format!("#{}", stem.to_string_lossy()))
        } else {
            None
        };

        Self {
            file_tag,
            show_invisibles: config.show_invisibles(),
        }
    }
}

impl RecordedSuite {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file: {}", path.display()))?;
        let suite = Self::parse(&content)
            .with_context(|| format!("Failed to parse suite file: {}", path.display()))?;
        debug!("Loaded {} test case(s) from {}", suite.tests.len(), path.display());
        Ok(suite)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid suite JSON")
    }

    pub fn into_test_cases(self, options: &ReplayOptions) -> Vec<TestCase> {
        self.tests
            .into_iter()
            .map(|test| {
                let mut info = TestCaseInfo::new(test.name.clone(), &test.tags);
                if let Some(tag) = &options.file_tag {
                    info.add_tag(tag);
                }
                let replay = Replay {
                    assertions: test.assertions,
                    show_invisibles: options.show_invisibles,
                };
                TestCase::new(info, replay)
            })
            .collect()
    }
}

struct Replay {
    assertions: Vec<RecordedAssertion>,
    show_invisibles: bool,
}

impl Replay {
    fn result_of(&self, recorded: &RecordedAssertion) -> AssertionResult {
        let expanded = recorded.expanded.as_deref().map(|text| {
            if self.show_invisibles {
                escape_invisibles(text)
            } else {
                text.to_string()
            }
        });

        AssertionResult {
            result_type: recorded.result,
            expression: recorded.expression.clone(),
            expanded,
            ok_to_fail: recorded.ok_to_fail,
        }
    }
}

impl TestInvoker for Replay {
    fn invoke(&self, ctx: &mut AssertionContext<'_>) {
        for recorded in &self.assertions {
            if !ctx.section_enabled(&recorded.section) {
                continue;
            }
            if recorded.throws_check && !ctx.allow_throws() {
                continue;
            }

            for message in &recorded.messages {
                ctx.attach(message.clone());
            }

            let result = self.result_of(recorded);
            let failed = !result.is_ok();
            let keep_going = ctx.assert(result);

            if !keep_going || (failed && recorded.required) {
                debug!("Stopping test case '{}' early", ctx.test_case().name);
                break;
            }
        }
    }
}

/// Make tab, newline and carriage return visible
pub fn escape_invisibles(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applies_defaults() {
        let suite = RecordedSuite::parse(
            r#"{"tests": [{"name": "adds", "assertions": [{"expression": "1 + 1 == 2"}]}]}"#,
        )
        .unwrap();

        let assertion = &suite.tests[0].assertions[0];
        assert_eq!(assertion.result, ResultWas::Ok);
        assert!(!assertion.required);
        assert!(assertion.section.is_empty());
        assert!(suite.tests[0].tags.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(RecordedSuite::parse("{\"tests\": [").is_err());
    }

    #[test]
    fn test_file_tag_added_to_every_case() {
        let suite = RecordedSuite {
            tests: vec![
                RecordedTest {
                    name: "a".into(),
                    ..Default::default()
                },
                RecordedTest {
                    name: "b".into(),
                    tags: vec!["[fast]".into()],
                    ..Default::default()
                },
            ],
        };
        let options = ReplayOptions {
            file_tag: Some("#math".into()),
            show_invisibles: false,
        };

        let cases = suite.into_test_cases(&options);
        assert!(cases.iter().all(|c| c.info.has_tag("#math")));
        assert_eq!(cases[1].info.tags, vec!["fast", "#math"]);
    }

    #[test]
    fn test_escape_invisibles() {
        assert_eq!(escape_invisibles("a\tb\nc\r"), "a\\tb\\nc\\r");
        assert_eq!(escape_invisibles("plain"), "plain");
    }
}
