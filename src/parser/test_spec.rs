// Compiled test selection: patterns over test names and tags

use regex::Regex;

use crate::error::ParseError;
use crate::state::TestCaseInfo;

/// Case-insensitive name pattern; `*` matches any run of characters
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub(crate) fn wildcard(source: &str, input: &str, offset: usize) -> Result<Self, ParseError> {
        let body = source
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Self::build(source, &body, input, offset)
    }

    pub(crate) fn exact(source: &str, input: &str, offset: usize) -> Result<Self, ParseError> {
        Self::build(source, &regex::escape(source), input, offset)
    }

    fn build(source: &str, body: &str, input: &str, offset: usize) -> Result<Self, ParseError> {
        let regex = Regex::new(&format!("(?is)^{}$", body))
            .map_err(|e| ParseError::at(input, offset, format!("invalid name pattern: {}", e)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name.trim())
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.regex.as_str() == other.regex.as_str()
    }
}

impl Eq for NamePattern {}

/// One predicate within a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Name(NamePattern),
    Tag(String),
    Exclude(Box<Pattern>),
}

impl Pattern {
    pub fn matches(&self, test: &TestCaseInfo) -> bool {
        match self {
            Pattern::Name(pattern) => pattern.matches(&test.name),
            Pattern::Tag(tag) => test.has_tag(tag),
            Pattern::Exclude(inner) => !inner.matches(test),
        }
    }
}

/// A conjunction of patterns, compiled from one comma-separated group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub(crate) source: String,
    pub(crate) patterns: Vec<Pattern>,
}

impl Filter {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn matches(&self, test: &TestCaseInfo) -> bool {
        self.patterns.iter().all(|p| p.matches(test))
    }
}

/// Selection predicate; filters are OR-ed together.
///
/// A spec without filters selects every test.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestSpec {
    pub(crate) filters: Vec<Filter>,
}

impl TestSpec {
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn matches(&self, test: &TestCaseInfo) -> bool {
        !self.has_filters() || self.filters.iter().any(|f| f.matches(test))
    }

    pub fn select<'a>(&self, tests: &'a [TestCaseInfo]) -> Vec<&'a TestCaseInfo> {
        tests.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(source: &str) -> NamePattern {
        NamePattern::wildcard(source, source, 0).unwrap()
    }

    #[test]
    fn test_wildcard_positions() {
        assert!(pattern("molecule*").matches("Molecule energy levels"));
        assert!(pattern("*levels").matches("molecule energy levels"));
        assert!(pattern("*energy*").matches("molecule energy levels"));
        assert!(pattern("mol*levels").matches("molecule energy levels"));
        assert!(!pattern("energy").matches("molecule energy levels"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(pattern("a+b (c)").matches("A+B (C)"));
        assert!(!pattern("a+b").matches("aab"));
    }

    #[test]
    fn test_empty_spec_matches_everything() {
        let spec = TestSpec::default();
        let tests = vec![
            TestCaseInfo::new("a", Vec::<String>::new()),
            TestCaseInfo::new("b", ["slow"]),
        ];
        assert_eq!(spec.select(&tests).len(), 2);
    }
}
