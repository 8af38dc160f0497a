// Run configuration: raw option values and the immutable snapshot built from them

pub mod file;
pub mod options;

pub use file::ConfigFile;
pub use options::{RunOrder, ShowDurations, UseColour, Verbosity, WarnAbout};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::output::{OutputStream, OutputTarget};
use crate::parser::{TestSpec, parse_test_spec};
use crate::report::ReporterRegistry;

/// Reporter used when none is named
pub const DEFAULT_REPORTER: &str = "tap";

/// Raw option values, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigData {
    pub list_tests: bool,
    pub list_tags: bool,
    pub list_reporters: bool,
    pub list_test_names_only: bool,

    pub show_successful_tests: bool,
    pub should_debug_break: bool,
    pub no_throw: bool,
    pub show_help: bool,
    pub show_invisibles: bool,
    pub filenames_as_tags: bool,
    pub allow_no_match: bool,

    /// Negative means unlimited
    pub abort_after: i32,
    pub rng_seed: u32,

    pub verbosity: Verbosity,
    pub warnings: WarnAbout,
    pub show_durations: ShowDurations,
    pub run_order: RunOrder,
    pub use_colour: UseColour,

    pub output_filename: String,
    pub name: String,
    pub process_name: String,

    pub reporter_names: Vec<String>,
    pub tests_or_tags: Vec<String>,
    pub sections_to_run: Vec<String>,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            list_tests: false,
            list_tags: false,
            list_reporters: false,
            list_test_names_only: false,
            show_successful_tests: false,
            should_debug_break: false,
            no_throw: false,
            show_help: false,
            show_invisibles: false,
            filenames_as_tags: false,
            allow_no_match: false,
            abort_after: -1,
            rng_seed: 0,
            verbosity: Verbosity::default(),
            warnings: WarnAbout::default(),
            show_durations: ShowDurations::default(),
            run_order: RunOrder::default(),
            use_colour: UseColour::default(),
            output_filename: String::new(),
            name: String::new(),
            process_name: env!("CARGO_PKG_NAME").to_string(),
            reporter_names: Vec::new(),
            tests_or_tags: Vec::new(),
            sections_to_run: Vec::new(),
        }
    }
}

impl ConfigData {
    fn validate(&self) -> Result<()> {
        let listing_modes = [
            ("--list-tests", self.list_tests),
            ("--list-test-names-only", self.list_test_names_only),
            ("--list-tags", self.list_tags),
            ("--list-reporters", self.list_reporters),
        ];
        let requested: Vec<&str> = listing_modes
            .iter()
            .filter(|(_, on)| *on)
            .map(|(flag, _)| *flag)
            .collect();

        if requested.len() > 1 {
            return Err(Error::ConflictingOptions(format!(
                "only one listing mode may be used at a time, got {}",
                requested.join(", ")
            )));
        }

        Ok(())
    }

    /// Every named reporter must be registered
    pub fn validate_reporters(&self, reporters: &ReporterRegistry) -> Result<()> {
        match self.reporter_names.iter().find(|name| !reporters.contains(name.as_str())) {
            Some(unknown) => Err(Error::UnknownReporter(unknown.clone())),
            None => Ok(()),
        }
    }
}

/// Immutable snapshot of everything a run needs.
///
/// Built once from `ConfigData`; a new run needs a new instance.
#[derive(Debug)]
pub struct RunConfiguration {
    data: ConfigData,
    test_spec: TestSpec,
    stream: OutputStream,
}

impl RunConfiguration {
    /// Build against the built-in reporters
    pub fn new(data: ConfigData) -> Result<Self> {
        Self::with_reporters(data, &ReporterRegistry::with_builtins())
    }

    /// Validate options, compile filters and open the output stream.
    ///
    /// Listing modes, reporter names, the stream selector and filters are
    /// all checked before anything is created or truncated on disk.
    pub fn with_reporters(data: ConfigData, reporters: &ReporterRegistry) -> Result<Self> {
        data.validate()?;
        data.validate_reporters(reporters)?;
        let target = OutputTarget::parse(&data.output_filename)?;
        let test_spec = parse_test_spec(&data.tests_or_tags)?;
        let stream = OutputStream::open(target)?;

        debug!(
            "Run configuration ready: {} filter(s), output {:?}",
            test_spec.filters().len(),
            stream.target()
        );

        Ok(Self {
            data,
            test_spec,
            stream,
        })
    }

    pub fn data(&self) -> &ConfigData {
        &self.data
    }

    pub fn test_spec(&self) -> &TestSpec {
        &self.test_spec
    }

    pub fn stream(&self) -> &OutputStream {
        &self.stream
    }

    pub fn list_tests(&self) -> bool {
        self.data.list_tests
    }

    pub fn list_test_names_only(&self) -> bool {
        self.data.list_test_names_only
    }

    pub fn list_tags(&self) -> bool {
        self.data.list_tags
    }

    pub fn list_reporters(&self) -> bool {
        self.data.list_reporters
    }

    /// Run name, falling back to the process name
    pub fn name(&self) -> &str {
        if self.data.name.is_empty() {
            &self.data.process_name
        } else {
            &self.data.name
        }
    }

    pub fn reporter_names(&self) -> Vec<String> {
        if self.data.reporter_names.is_empty() {
            vec![DEFAULT_REPORTER.to_string()]
        } else {
            self.data.reporter_names.clone()
        }
    }

    pub fn sections_to_run(&self) -> &[String] {
        &self.data.sections_to_run
    }

    pub fn show_help(&self) -> bool {
        self.data.show_help
    }

    pub fn allow_throws(&self) -> bool {
        !self.data.no_throw
    }

    pub fn include_successful_results(&self) -> bool {
        self.data.show_successful_tests
    }

    pub fn warn_about_missing_assertions(&self) -> bool {
        self.data.warnings == WarnAbout::NoAssertions
    }

    pub fn show_durations(&self) -> ShowDurations {
        self.data.show_durations
    }

    pub fn run_order(&self) -> RunOrder {
        self.data.run_order
    }

    pub fn rng_seed(&self) -> u32 {
        self.data.rng_seed
    }

    pub fn use_colour(&self) -> UseColour {
        self.data.use_colour
    }

    pub fn should_debug_break(&self) -> bool {
        self.data.should_debug_break
    }

    /// Failed-assertion threshold, `None` when unlimited
    pub fn abort_after(&self) -> Option<u32> {
        u32::try_from(self.data.abort_after).ok().filter(|n| *n > 0)
    }

    pub fn show_invisibles(&self) -> bool {
        self.data.show_invisibles
    }

    pub fn filenames_as_tags(&self) -> bool {
        self.data.filenames_as_tags
    }

    pub fn allow_no_match(&self) -> bool {
        self.data.allow_no_match
    }

    /// Whether reporters may emit terminal colour on this run's stream
    pub fn colour_enabled(&self) -> bool {
        if !self.stream.is_console() {
            return false;
        }
        match self.data.use_colour {
            UseColour::Yes => true,
            UseColour::No => false,
            UseColour::Auto => console::colors_enabled(),
        }
    }
}

impl PartialEq for RunConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.test_spec == other.test_spec
            && self.stream.target() == other.stream.target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfiguration::new(ConfigData::default()).unwrap();
        assert_eq!(config.abort_after(), None);
        assert_eq!(config.reporter_names(), vec!["tap".to_string()]);
        assert_eq!(config.name(), "tapline");
        assert!(config.allow_throws());
        assert!(!config.test_spec().has_filters());
        assert_eq!(config.stream().target(), &OutputTarget::Console);
    }

    #[test]
    fn test_abort_after_threshold() {
        let data = ConfigData {
            abort_after: 3,
            ..ConfigData::default()
        };
        let config = RunConfiguration::new(data).unwrap();
        assert_eq!(config.abort_after(), Some(3));
    }

    #[test]
    fn test_conflicting_listing_modes() {
        let data = ConfigData {
            list_tests: true,
            list_tags: true,
            ..ConfigData::default()
        };
        let err = RunConfiguration::new(data).unwrap_err();
        assert!(matches!(err, Error::ConflictingOptions(_)));
    }

    #[test]
    fn test_reporter_names_checked_against_registry() {
        let data = ConfigData {
            reporter_names: vec!["tap".into()],
            ..ConfigData::default()
        };
        let err = RunConfiguration::with_reporters(data.clone(), &ReporterRegistry::empty())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownReporter(ref name) if name == "tap"));
        assert!(RunConfiguration::new(data).is_ok());
    }

    #[test]
    fn test_name_overrides_process_name() {
        let data = ConfigData {
            name: "nightly".into(),
            ..ConfigData::default()
        };
        assert_eq!(RunConfiguration::new(data).unwrap().name(), "nightly");
    }
}
