// Test filter parsing: turns command-line filter strings into a TestSpec

pub mod spec_parser;
pub mod test_spec;

pub use spec_parser::{TestSpecParser, parse_test_spec};
pub use test_spec::{Filter, NamePattern, Pattern, TestSpec};
