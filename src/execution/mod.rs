// Execution module

pub mod context;
pub mod runner;
pub mod suite;

pub use context::AssertionContext;
pub use runner::{RunOutcome, TestCase, TestInvoker, TestRunner};
pub use suite::{RecordedAssertion, RecordedSuite, RecordedTest, ReplayOptions};
