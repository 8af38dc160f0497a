// Single-pass parser for test name and tag filters
//
// Grammar, per input string:
//   filter   := pattern* ("," pattern*)*
//   pattern  := ["~" | "exclude:"] (name | "\"" exact "\"" | "[" tag "]")
// Patterns within a filter are AND-ed; filters are OR-ed, as are input strings.

use tracing::debug;

use super::test_spec::{Filter, NamePattern, Pattern, TestSpec};
use crate::error::ParseError;

const EXCLUDE_PREFIX: &str = "exclude:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Name,
    QuotedName,
    Tag,
}

/// Compiles filter strings into a `TestSpec`
#[derive(Debug, Default)]
pub struct TestSpecParser {
    filters: Vec<Filter>,
}

impl TestSpecParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one filter string, adding its filters to the spec being built
    pub fn parse(&mut self, input: &str) -> Result<&mut Self, ParseError> {
        let filters = InputScanner::new(input).scan()?;
        debug!("Compiled '{}' into {} filter(s)", input, filters.len());
        self.filters.extend(filters);
        Ok(self)
    }

    pub fn test_spec(&self) -> TestSpec {
        TestSpec {
            filters: self.filters.clone(),
        }
    }

    pub fn into_test_spec(self) -> TestSpec {
        TestSpec {
            filters: self.filters,
        }
    }
}

/// Compile a sequence of filter strings. No strings means no filtering.
pub fn parse_test_spec<I, S>(inputs: I) -> Result<TestSpec, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = TestSpecParser::new();
    for input in inputs {
        parser.parse(input.as_ref())?;
    }
    Ok(parser.into_test_spec())
}

struct InputScanner<'a> {
    input: &'a str,
    chars: Vec<char>,
    mode: Mode,
    token: String,
    token_start: usize,
    exclusion: bool,
    group_start: usize,
    patterns: Vec<Pattern>,
    filters: Vec<Filter>,
}

impl<'a> InputScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            mode: Mode::None,
            token: String::new(),
            token_start: 0,
            exclusion: false,
            group_start: 0,
            patterns: Vec::new(),
            filters: Vec::new(),
        }
    }

    fn scan(mut self) -> Result<Vec<Filter>, ParseError> {
        for pos in 0..self.chars.len() {
            let c = self.chars[pos];
            self.visit(pos, c)?;
        }

        match self.mode {
            Mode::Name => self.finish_name()?,
            Mode::QuotedName => {
                return Err(self.error(self.token_start, "unterminated quoted test name"));
            }
            Mode::Tag => return Err(self.error(self.token_start, "unbalanced '[' in tag")),
            Mode::None => {}
        }
        self.finish_filter(self.chars.len());

        Ok(self.filters)
    }

    fn visit(&mut self, pos: usize, c: char) -> Result<(), ParseError> {
        match self.mode {
            Mode::None => match c {
                ' ' | '\t' => {}
                '~' => self.exclusion = true,
                '[' => self.start(Mode::Tag, pos),
                '"' => self.start(Mode::QuotedName, pos),
                ']' => return Err(self.error(pos, "unbalanced ']' in tag")),
                ',' => self.finish_filter(pos),
                _ => {
                    self.start(Mode::Name, pos);
                    self.token.push(c);
                }
            },
            Mode::Name => match c {
                ',' => {
                    self.finish_name()?;
                    self.finish_filter(pos);
                }
                '[' => {
                    if self.token == EXCLUDE_PREFIX {
                        self.exclusion = true;
                    } else {
                        self.finish_name()?;
                    }
                    self.start(Mode::Tag, pos);
                }
                ']' => return Err(self.error(pos, "unbalanced ']' in tag")),
                _ => self.token.push(c),
            },
            Mode::QuotedName => match c {
                '"' => {
                    let pattern = NamePattern::exact(&self.token, self.input, self.token_start)?;
                    self.add_pattern(Pattern::Name(pattern));
                }
                _ => self.token.push(c),
            },
            Mode::Tag => match c {
                ']' => {
                    let tag = self.token.trim().to_lowercase();
                    if tag.is_empty() {
                        return Err(self.error(self.token_start, "empty tag"));
                    }
                    self.add_pattern(Pattern::Tag(tag));
                }
                '[' => return Err(self.error(self.token_start, "unbalanced '[' in tag")),
                _ => self.token.push(c),
            },
        }
        Ok(())
    }

    fn start(&mut self, mode: Mode, pos: usize) {
        self.mode = mode;
        self.token.clear();
        self.token_start = pos;
    }

    fn finish_name(&mut self) -> Result<(), ParseError> {
        let mut name = self.token.trim();
        let mut offset = self.token_start;
        if let Some(rest) = name.strip_prefix(EXCLUDE_PREFIX) {
            self.exclusion = true;
            offset += EXCLUDE_PREFIX.len();
            name = rest.trim_start();
        }

        if name.is_empty() {
            self.mode = Mode::None;
            self.token.clear();
            return Ok(());
        }

        let pattern = NamePattern::wildcard(name, self.input, offset)?;
        self.add_pattern(Pattern::Name(pattern));
        Ok(())
    }

    fn add_pattern(&mut self, pattern: Pattern) {
        let pattern = if self.exclusion {
            Pattern::Exclude(Box::new(pattern))
        } else {
            pattern
        };
        self.patterns.push(pattern);
        self.exclusion = false;
        self.mode = Mode::None;
        self.token.clear();
    }

    fn finish_filter(&mut self, end: usize) {
        if !self.patterns.is_empty() {
            let source: String = self.chars[self.group_start..end].iter().collect();
            self.filters.push(Filter {
                source: source.trim().to_string(),
                patterns: std::mem::take(&mut self.patterns),
            });
        }
        self.exclusion = false;
        self.group_start = end + 1;
    }

    fn error(&self, offset: usize, message: &str) -> ParseError {
        ParseError::at(self.input, offset, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TestCaseInfo;

    fn test(name: &str, tags: &[&str]) -> TestCaseInfo {
        TestCaseInfo::new(name, tags.iter().copied())
    }

    #[test]
    fn test_name_and_tags_are_anded() {
        let spec = parse_test_spec(["vibr* [unit]"]).unwrap();
        assert_eq!(spec.filters().len(), 1);
        assert_eq!(spec.filters()[0].patterns().len(), 2);
        assert!(spec.matches(&test("vibrational levels", &["unit"])));
        assert!(!spec.matches(&test("vibrational levels", &["slow"])));
        assert!(!spec.matches(&test("rotational levels", &["unit"])));
    }

    #[test]
    fn test_comma_starts_new_filter() {
        let spec = parse_test_spec(["[a],[b]"]).unwrap();
        assert_eq!(spec.filters().len(), 2);
        assert_eq!(spec.filters()[0].source(), "[a]");
        assert_eq!(spec.filters()[1].source(), "[b]");
        assert!(spec.matches(&test("x", &["b"])));
    }

    #[test]
    fn test_negation_forms() {
        let spec = parse_test_spec(["~[slow]"]).unwrap();
        assert!(spec.matches(&test("x", &["fast"])));
        assert!(!spec.matches(&test("x", &["slow"])));

        let spec = parse_test_spec(["exclude:[slow]"]).unwrap();
        assert!(!spec.matches(&test("x", &["slow"])));

        let spec = parse_test_spec(["exclude:dump*"]).unwrap();
        assert!(!spec.matches(&test("dump spectrum", &[])));
        assert!(spec.matches(&test("load spectrum", &[])));
    }

    #[test]
    fn test_quoted_name_is_exact() {
        let spec = parse_test_spec(["\"a*b\""]).unwrap();
        assert!(spec.matches(&test("A*B", &[])));
        assert!(!spec.matches(&test("axxb", &[])));
    }

    #[test]
    fn test_unterminated_tag_reports_offset() {
        let err = parse_test_spec(["name [unit"]).unwrap_err();
        assert_eq!(err.offset, 5);
        assert_eq!(err.fragment, "[unit");
    }

    #[test]
    fn test_stray_closing_bracket() {
        let err = parse_test_spec(["[a]]"]).unwrap_err();
        assert_eq!(err.offset, 3);
        assert!(err.message.contains("']'"));
    }

    #[test]
    fn test_nested_open_bracket() {
        let err = parse_test_spec(["[a[b]"]).unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn test_empty_tag_and_unterminated_quote() {
        assert_eq!(parse_test_spec(["x []"]).unwrap_err().offset, 2);
        assert_eq!(parse_test_spec(["\"abc"]).unwrap_err().offset, 0);
    }

    #[test]
    fn test_blank_input_adds_no_filter() {
        let spec = parse_test_spec(["   "]).unwrap();
        assert!(!spec.has_filters());
    }
}
