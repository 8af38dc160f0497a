// Enumerated run options and their textual forms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    High,
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(Error::invalid_option("verbosity", s)),
        }
    }
}

/// Extra warnings that turn into failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarnAbout {
    #[default]
    Nothing,
    NoAssertions,
}

impl FromStr for WarnAbout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "nothing" => Ok(Self::Nothing),
            "noassertions" => Ok(Self::NoAssertions),
            _ => Err(Error::invalid_option("warn", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowDurations {
    #[default]
    #[serde(rename = "default")]
    DefaultForReporter,
    #[serde(rename = "yes")]
    Always,
    #[serde(rename = "no")]
    Never,
}

impl FromStr for ShowDurations {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::DefaultForReporter),
            "yes" | "always" => Ok(Self::Always),
            "no" | "never" => Ok(Self::Never),
            _ => Err(Error::invalid_option("durations", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOrder {
    #[default]
    Declared,
    Lexicographic,
    Random,
}

impl FromStr for RunOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "declared" | "decl" => Ok(Self::Declared),
            "lexicographic" | "lex" => Ok(Self::Lexicographic),
            "random" | "rand" => Ok(Self::Random),
            _ => Err(Error::invalid_option("order", s)),
        }
    }
}

impl fmt::Display for RunOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunOrder::Declared => "declared",
            RunOrder::Lexicographic => "lexicographic",
            RunOrder::Random => "random",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseColour {
    #[default]
    Auto,
    Yes,
    No,
}

impl FromStr for UseColour {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(Error::invalid_option("use-colour", s)),
        }
    }
}
