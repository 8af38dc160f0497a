// Tests for reporters - public API only

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tapline::config::{ConfigData, RunConfiguration, ShowDurations};
use tapline::execution::{TestCase, TestRunner};
use tapline::output::StreamWriter;
use tapline::report::{
    MultiReporter, Reporter, ReporterConfig, ReporterRegistry, StreamingJsonReporter, TapPlan,
    TapReporter,
};
use tapline::state::{AssertionResult, MessageInfo, ResultWas, TestCaseInfo};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn reporter_config(buffer: &SharedBuffer) -> ReporterConfig {
    ReporterConfig::new(StreamWriter::new(buffer.clone()))
}

fn run_with(data: ConfigData, tests: &[TestCase], reporter: &mut dyn Reporter) {
    let config = RunConfiguration::new(data).unwrap();
    TestRunner::new(&config).run(tests, reporter).unwrap();
}

fn tap_output(data: ConfigData, tests: &[TestCase]) -> String {
    let buffer = SharedBuffer::default();
    let mut reporter = TapReporter::new(&reporter_config(&buffer));
    run_with(data, tests, &mut reporter);
    buffer.contents()
}

#[test]
fn test_single_passing_assertion() {
    // Arrange
    let tests = vec![TestCase::from_fn(
        TestCaseInfo::new("arithmetic", ["unit"]),
        |ctx| {
            ctx.assert(AssertionResult::passed("1 == 1"));
        },
    )];

    // Act
    let output = tap_output(ConfigData::default(), &tests);

    // Assert
    assert_eq!(output, "ok 1 - 1 == 1 # arithmetic\n1..1\n\n");
}

#[test]
fn test_single_failing_assertion() {
    // Arrange
    let tests = vec![TestCase::from_fn(
        TestCaseInfo::new("arithmetic", ["unit"]),
        |ctx| {
            ctx.assert(AssertionResult::failed("1 == 2", "1 == 2"));
        },
    )];

    // Act
    let output = tap_output(ConfigData::default(), &tests);

    // Assert
    assert_eq!(
        output,
        "not ok 1 - 1 == 2 for: 1 == 2 # arithmetic\n1..1\n\n"
    );
}

#[test]
fn test_no_tests_ran_plan() {
    // Arrange
    let tests: Vec<TestCase> = Vec::new();

    // Act
    let output = tap_output(ConfigData::default(), &tests);

    // Assert
    assert_eq!(output, "1..0 # Skipped: No tests ran.\n\n");
    assert_eq!(
        output.lines().next().unwrap().parse::<TapPlan>().unwrap(),
        TapPlan::NoTestsRan
    );
}

#[test]
fn test_unmatched_filter_is_commented() {
    // Arrange
    let tests = vec![TestCase::from_fn(TestCaseInfo::new("present", ["unit"]), |ctx| {
        ctx.assert(AssertionResult::passed("true"));
    })];
    let data = ConfigData {
        tests_or_tags: vec!["absent".into()],
        ..ConfigData::default()
    };

    // Act
    let output = tap_output(data, &tests);

    // Assert
    assert_eq!(
        output,
        "# No test cases matched 'absent'\n1..0 # Skipped: No tests ran.\n\n"
    );
}

#[test]
fn test_counter_covers_every_assertion_kind() {
    // Arrange
    let tests = vec![
        TestCase::from_fn(TestCaseInfo::new("first", ["a"]), |ctx| {
            ctx.assert(AssertionResult::passed("x"));
            ctx.info("checkpoint");
            ctx.assert(AssertionResult::new(ResultWas::Info));
            ctx.assert(AssertionResult::failed("y", "1 == 2"));
        }),
        TestCase::from_fn(TestCaseInfo::new("second", ["b"]), |ctx| {
            ctx.warn("careful");
            ctx.fail("gave up");
        }),
    ];

    let buffer = SharedBuffer::default();
    let mut reporter = TapReporter::new(&reporter_config(&buffer));

    // Act
    run_with(ConfigData::default(), &tests, &mut reporter);

    // Assert
    assert_eq!(reporter.counter(), 5);
    let output = buffer.contents();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ok 1 - x # first",
            "info 'checkpoint' # first",
            "not ok 3 - y for: 1 == 2 # first",
            "warning 'careful' # second",
            "not ok 5 - explicitly with 1 message: 'gave up' # second",
            "1..5",
            "",
        ]
    );
}

#[test]
fn test_messages_and_expected_failures() {
    // Arrange
    let tests = vec![TestCase::from_fn(TestCaseInfo::new("msgs", ["m"]), |ctx| {
        ctx.info("left was 3");
        ctx.info("right was 4");
        ctx.assert(AssertionResult::failed("l == r", "3 == 4"));
        ctx.assert(AssertionResult::failed("flaky()", "false").ok_to_fail());
    })];

    // Act
    let output = tap_output(ConfigData::default(), &tests);

    // Assert
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "not ok 1 - l == r for: 3 == 4 with 2 messages: 'left was 3' and 'right was 4' # msgs"
    );
    assert_eq!(lines[1], "ok 2 - flaky() for: false # TODO # msgs");
}

#[test]
fn test_exception_lines() {
    // Arrange
    let tests = vec![TestCase::from_fn(TestCaseInfo::new("throws", ["e"]), |ctx| {
        ctx.attach(MessageInfo::info("division by zero"));
        ctx.assert(AssertionResult::new(ResultWas::ThrewException).with_expression("div(1, 0)"));
        ctx.assert(AssertionResult::new(ResultWas::DidntThrowException).with_expression("ok()"));
    })];

    // Act
    let output = tap_output(ConfigData::default(), &tests);

    // Assert
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "not ok 1 - unexpected exception with message: 'division by zero'; expression was: div(1, 0) # throws"
    );
    assert_eq!(
        lines[1],
        "not ok 2 - expected exception, got none; expression was: ok() # throws"
    );
}

#[test]
fn test_tolerated_exception_still_not_ok() {
    // Arrange
    let tests = vec![TestCase::from_fn(TestCaseInfo::new("tolerated", ["t"]), |ctx| {
        ctx.attach(MessageInfo::info("boom"));
        ctx.assert(
            AssertionResult::new(ResultWas::ThrewException)
                .with_expression("risky()")
                .ok_to_fail(),
        );
    })];

    // Act
    let output = tap_output(ConfigData::default(), &tests);

    // Assert
    assert_eq!(
        output,
        "not ok 1 - unexpected exception with message: 'boom'; expression was: risky() # tolerated\n1..1\n\n"
    );
}

#[test]
fn test_multi_reporter_fans_out() {
    // Arrange
    let tap_buffer = SharedBuffer::default();
    let json_buffer = SharedBuffer::default();
    let mut multi = MultiReporter::new();
    multi.add(Box::new(TapReporter::new(&reporter_config(&tap_buffer))));
    multi.add(Box::new(StreamingJsonReporter::new(&reporter_config(
        &json_buffer,
    ))));
    let tests = vec![TestCase::from_fn(TestCaseInfo::new("both", ["x"]), |ctx| {
        ctx.assert(AssertionResult::failed("a", "b"));
    })];

    // Act
    run_with(ConfigData::default(), &tests, &mut multi);

    // Assert
    assert_eq!(multi.len(), 2);
    assert!(tap_buffer.contents().starts_with("not ok 1 - a for: b # both\n"));
    assert!(json_buffer.contents().contains("\"event\":\"run_end\""));
}

#[test]
fn test_json_lines_events() {
    // Arrange
    let buffer = SharedBuffer::default();
    let mut config = reporter_config(&buffer);
    config.show_durations = ShowDurations::Always;
    let mut reporter = StreamingJsonReporter::new(&config);
    let tests = vec![TestCase::from_fn(TestCaseInfo::new("json", ["j"]), |ctx| {
        ctx.assert(AssertionResult::passed("hidden"));
        ctx.assert(AssertionResult::failed("shown", "0 == 1"));
    })];

    // Act
    run_with(ConfigData::default(), &tests, &mut reporter);

    // Assert
    let events: Vec<serde_json::Value> = buffer
        .contents()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec!["run_start", "test_start", "assertion", "test_fail", "run_end"]
    );
    assert_eq!(events[2]["expression"], "shown");
    assert_eq!(events[2]["result"], "expression_failed");
    assert!(events[3]["duration"].is_u64());
    assert_eq!(events[4]["summary"]["assertions"]["failed"], 1);
}

#[test]
fn test_registry_rejects_unknown_name() {
    // Arrange
    let registry = ReporterRegistry::with_builtins();
    let buffer = SharedBuffer::default();

    // Act
    let result = registry.create("xml", &reporter_config(&buffer));

    // Assert
    assert!(result.is_err());
    assert!(registry.contains("tap"));
    assert!(registry.contains("jsonl"));
}
