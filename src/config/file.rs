// Configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{ConfigData, RunOrder, ShowDurations, UseColour, Verbosity, WarnAbout};

/// File name searched for in the working and home directories
pub const CONFIG_FILE_NAME: &str = ".taplinerc.toml";

/// Defaults read from `.taplinerc.toml`; command-line values win
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub run: RunDefaults,

    #[serde(default)]
    pub output: OutputDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDefaults {
    /// Test execution order
    #[serde(default)]
    pub order: RunOrder,

    /// Seed for random ordering
    #[serde(default)]
    pub rng_seed: u32,

    /// Stop after this many failed assertions (negative: never)
    #[serde(default = "default_abort_after")]
    pub abort_after: i32,

    #[serde(default)]
    pub warnings: WarnAbout,

    /// Do not fail the run when a filter matches no tests
    #[serde(default)]
    pub allow_no_match: bool,

    /// Report passing assertions too
    #[serde(default)]
    pub show_successful: bool,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            order: RunOrder::default(),
            rng_seed: 0,
            abort_after: default_abort_after(),
            warnings: WarnAbout::default(),
            allow_no_match: false,
            show_successful: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// Reporters to activate
    #[serde(default = "default_reporters")]
    pub reporters: Vec<String>,

    /// Output file, `%debug`, or empty for stdout
    #[serde(default)]
    pub out: String,

    #[serde(default)]
    pub use_colour: UseColour,

    #[serde(default)]
    pub durations: ShowDurations,

    #[serde(default)]
    pub verbosity: Verbosity,
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            reporters: default_reporters(),
            out: String::new(),
            use_colour: UseColour::default(),
            durations: ShowDurations::default(),
            verbosity: Verbosity::default(),
        }
    }
}

fn default_abort_after() -> i32 {
    -1
}

fn default_reporters() -> Vec<String> {
    vec![super::DEFAULT_REPORTER.to_string()]
}

impl ConfigFile {
    /// Load configuration from the working directory, then the home directory.
    ///
    /// No file is not an error; an unreadable or malformed one is.
    pub fn load() -> Result<Option<Self>> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }

        paths
            .iter()
            .find(|path| path.exists())
            .map(|path| Self::load_from_file(path))
            .transpose()
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Malformed configuration file: {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Seed raw option values with the file's defaults
    pub fn apply(&self, data: &mut ConfigData) {
        data.run_order = self.run.order;
        data.rng_seed = self.run.rng_seed;
        data.abort_after = self.run.abort_after;
        data.warnings = self.run.warnings;
        data.allow_no_match = self.run.allow_no_match;
        data.show_successful_tests = self.run.show_successful;

        data.reporter_names = self.output.reporters.clone();
        data.output_filename = self.output.out.clone();
        data.use_colour = self.output.use_colour;
        data.show_durations = self.output.durations;
        data.verbosity = self.output.verbosity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[run]
order = "random"
rng_seed = 42
abort_after = 2
warnings = "no-assertions"

[output]
reporters = ["tap", "jsonl"]
out = "results.tap"
use_colour = "no"
durations = "yes"
"#;

        let config = ConfigFile::parse(toml).expect("Failed to parse config");
        assert_eq!(config.run.order, RunOrder::Random);
        assert_eq!(config.run.rng_seed, 42);
        assert_eq!(config.run.abort_after, 2);
        assert_eq!(config.run.warnings, WarnAbout::NoAssertions);
        assert_eq!(config.output.reporters, vec!["tap", "jsonl"]);
        assert_eq!(config.output.out, "results.tap");
        assert_eq!(config.output.use_colour, UseColour::No);
        assert_eq!(config.output.durations, ShowDurations::Always);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ConfigFile::parse("").expect("empty config is valid");
        assert_eq!(config.run.abort_after, -1);
        assert_eq!(config.output.reporters, vec!["tap"]);
    }

    #[test]
    fn test_apply_and_round_trip() {
        let mut config = ConfigFile::default();
        config.run.order = RunOrder::Lexicographic;
        let reparsed = ConfigFile::parse(&config.to_toml()).unwrap();

        let mut data = ConfigData::default();
        reparsed.apply(&mut data);
        assert_eq!(data.run_order, RunOrder::Lexicographic);
        assert_eq!(data.reporter_names, vec!["tap"]);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[run]\norder = 42\n").unwrap();

        let err = ConfigFile::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Malformed configuration file"));
    }
}
