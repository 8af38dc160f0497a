// Error taxonomy for configuration, filter parsing and output streams

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a failure, surfaced before any test runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Parse,
    Io,
}

/// Errors raised while building a run configuration
#[derive(Debug, Error)]
pub enum Error {
    #[error("unrecognised stream selector: {0}")]
    UnrecognisedStream(String),

    #[error("conflicting options: {0}")]
    ConflictingOptions(String),

    #[error("no reporter registered with name: '{0}'")]
    UnknownReporter(String),

    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption { option: String, value: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unable to open output file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnrecognisedStream(_)
            | Error::ConflictingOptions(_)
            | Error::UnknownReporter(_)
            | Error::InvalidOption { .. } => ErrorKind::Config,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_option(option: &str, value: &str) -> Self {
        Error::InvalidOption {
            option: option.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A malformed test filter.
///
/// `offset` counts characters (not bytes) from the start of `input`;
/// `fragment` is the text from the offending position to the end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset} in test filter '{input}' (near '{fragment}')")]
pub struct ParseError {
    pub input: String,
    pub fragment: String,
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            fragment: input.chars().skip(offset).collect(),
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_fragment_uses_char_offset() {
        let err = ParseError::at("ä[unit", 1, "unterminated tag");
        assert_eq!(err.fragment, "[unit");
        assert_eq!(err.offset, 1);
        assert!(err.to_string().contains("offset 1"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::UnrecognisedStream("%bogus".into()).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            Error::from(ParseError::at("[", 0, "x")).kind(),
            ErrorKind::Parse
        );
        let io = Error::Io {
            path: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(io.kind(), ErrorKind::Io);
    }
}
