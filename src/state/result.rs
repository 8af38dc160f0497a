// Assertion result structures

use serde::{Deserialize, Serialize};

/// Outcome of a single assertion.
///
/// The numeric values keep the failure bit layout: every kind with
/// `FAILURE_BIT` set is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultWas {
    Unknown,
    Ok,
    Info,
    Warning,
    FailureBit,
    ExpressionFailed,
    ExplicitFailure,
    Exception,
    ThrewException,
    DidntThrowException,
    FatalErrorCondition,
}

impl ResultWas {
    pub const FAILURE_BIT: i32 = 0x10;

    pub fn code(self) -> i32 {
        match self {
            ResultWas::Unknown => -1,
            ResultWas::Ok => 0,
            ResultWas::Info => 1,
            ResultWas::Warning => 2,
            ResultWas::FailureBit => 0x10,
            ResultWas::ExpressionFailed => 0x11,
            ResultWas::ExplicitFailure => 0x12,
            ResultWas::Exception => 0x110,
            ResultWas::ThrewException => 0x111,
            ResultWas::DidntThrowException => 0x112,
            ResultWas::FatalErrorCondition => 0x210,
        }
    }

    pub fn is_ok(self) -> bool {
        self.code() & Self::FAILURE_BIT == 0
    }

    /// Markers that never describe a real assertion
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            ResultWas::Unknown | ResultWas::FailureBit | ResultWas::Exception
        )
    }
}

/// An info or warning message attached to an assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    #[serde(default = "default_message_kind")]
    pub kind: ResultWas,
    pub text: String,
}

fn default_message_kind() -> ResultWas {
    ResultWas::Info
}

impl MessageInfo {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: ResultWas::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: ResultWas::Warning,
            text: text.into(),
        }
    }
}

/// What is known about an assertion before it is evaluated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssertionInfo {
    pub test_case_name: String,
    pub expression: Option<String>,
}

/// Evaluated assertion, with expression text captured by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    pub result_type: ResultWas,
    pub expression: Option<String>,
    pub expanded: Option<String>,
    /// Failure is expected and must not fail the run
    pub ok_to_fail: bool,
}

impl AssertionResult {
    pub fn new(result_type: ResultWas) -> Self {
        Self {
            result_type,
            expression: None,
            expanded: None,
            ok_to_fail: false,
        }
    }

    pub fn passed(expression: impl Into<String>) -> Self {
        Self::new(ResultWas::Ok).with_expression(expression)
    }

    pub fn failed(expression: impl Into<String>, expanded: impl Into<String>) -> Self {
        Self::new(ResultWas::ExpressionFailed)
            .with_expression(expression)
            .with_expanded(expanded)
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_expanded(mut self, expanded: impl Into<String>) -> Self {
        self.expanded = Some(expanded.into());
        self
    }

    pub fn ok_to_fail(mut self) -> Self {
        self.ok_to_fail = true;
        self
    }

    pub fn has_expression(&self) -> bool {
        self.expression.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_expanded_expression(&self) -> bool {
        self.expanded.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Passed, or failed in a way the run tolerates
    pub fn is_ok(&self) -> bool {
        self.result_type.is_ok() || self.ok_to_fail
    }
}

/// Everything a reporter receives for one assertion
#[derive(Debug, Clone)]
pub struct AssertionStats {
    pub result: AssertionResult,
    pub messages: Vec<MessageInfo>,
    pub test_case_name: String,
    pub totals: super::Totals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_bit_classification() {
        assert!(ResultWas::Ok.is_ok());
        assert!(ResultWas::Info.is_ok());
        assert!(ResultWas::Warning.is_ok());
        assert!(!ResultWas::ExpressionFailed.is_ok());
        assert!(!ResultWas::ThrewException.is_ok());
        assert!(!ResultWas::FatalErrorCondition.is_ok());
        assert!(!ResultWas::Unknown.is_ok());
        assert!(!ResultWas::Exception.is_ok());
    }

    #[test]
    fn test_ok_to_fail_keeps_result_kind() {
        let result = AssertionResult::failed("a == b", "1 == 2").ok_to_fail();
        assert_eq!(result.result_type, ResultWas::ExpressionFailed);
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_expression_is_absent() {
        let result = AssertionResult::new(ResultWas::Ok).with_expression("");
        assert!(!result.has_expression());
    }

    #[test]
    fn test_result_kind_serde_names() {
        let json = serde_json::to_string(&ResultWas::DidntThrowException).unwrap();
        assert_eq!(json, "\"didnt_throw_exception\"");
    }
}
