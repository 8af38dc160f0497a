// CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigData, ConfigFile};
use crate::error::Error;

/// Replay recorded test suites through line-protocol reporters
#[derive(Parser, Debug)]
#[command(name = "tapline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run recorded test suites and report them as TAP", long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Test names or tag filters, e.g. "adds*" or "[unit]~[slow]"
    #[arg(value_name = "TEST_OR_TAGS")]
    pub tests_or_tags: Vec<String>,

    /// Recorded suite file (JSON) to replay
    #[arg(long, value_name = "FILE")]
    pub suite: Option<PathBuf>,

    /// List matching test cases
    #[arg(short = 'l', long, default_value_t = false)]
    pub list_tests: bool,

    /// List tags of matching test cases
    #[arg(short = 't', long, default_value_t = false)]
    pub list_tags: bool,

    /// List matching test case names only
    #[arg(long, default_value_t = false)]
    pub list_test_names_only: bool,

    /// List available reporters
    #[arg(long, default_value_t = false)]
    pub list_reporters: bool,

    /// Include successful assertions in the output
    #[arg(short = 's', long, default_value_t = false)]
    pub success: bool,

    /// Trace failed assertions when a debugger is attached
    #[arg(short = 'b', long = "break", default_value_t = false)]
    pub debug_break: bool,

    /// Skip assertions that only check for thrown errors
    #[arg(short = 'e', long = "nothrow", default_value_t = false)]
    pub no_throw: bool,

    /// Print help
    #[arg(short = 'h', long, action = clap::ArgAction::SetTrue)]
    pub help: bool,

    /// Show invisible characters in expanded expressions
    #[arg(short = 'i', long, default_value_t = false)]
    pub invisibles: bool,

    /// Tag each test case with its suite file name
    #[arg(long, default_value_t = false)]
    pub filenames_as_tags: bool,

    /// Stop after N failed assertions (1 when no value is given)
    #[arg(
        short = 'a',
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "1",
        require_equals = true
    )]
    pub abort: Option<i32>,

    /// Seed for random ordering, or "time"
    #[arg(long, value_name = "SEED")]
    pub rng_seed: Option<String>,

    /// Test order: decl, lex or rand
    #[arg(long, value_name = "ORDER")]
    pub order: Option<String>,

    /// Colour mode: auto, yes or no
    #[arg(long, value_name = "MODE")]
    pub use_colour: Option<String>,

    /// Output file, or %debug for the debugger channel
    #[arg(short = 'o', long, value_name = "FILE")]
    pub out: Option<String>,

    /// Name for this run
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Reporters to use (comma separated)
    #[arg(short = 'r', long, value_delimiter = ',')]
    pub reporter: Vec<String>,

    /// Only run assertions in this section path (repeatable)
    #[arg(short = 'c', long, value_name = "SECTION")]
    pub section: Vec<String>,

    /// Show test durations: yes or no
    #[arg(short = 'd', long, value_name = "YES|NO")]
    pub durations: Option<String>,

    /// Enable warnings, e.g. NoAssertions
    #[arg(short = 'w', long, value_name = "WARNING")]
    pub warn: Option<String>,

    /// Verbosity: quiet, normal or high
    #[arg(long, value_name = "LEVEL")]
    pub verbosity: Option<String>,

    /// Shorthand for --verbosity high
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Do not fail when a filter matches no test case
    #[arg(long, default_value_t = false)]
    pub allow_no_match: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Print shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

impl Cli {
    /// Merge command-line values over the file defaults
    pub fn config_data(&self, file: Option<&ConfigFile>) -> Result<ConfigData, Error> {
        let mut data = ConfigData::default();
        if let Some(file) = file {
            file.apply(&mut data);
        }

        data.tests_or_tags = self.tests_or_tags.clone();
        data.sections_to_run = self.section.clone();

        data.list_tests = self.list_tests;
        data.list_tags = self.list_tags;
        data.list_test_names_only = self.list_test_names_only;
        data.list_reporters = self.list_reporters;

        data.show_successful_tests |= self.success;
        data.should_debug_break = self.debug_break;
        data.no_throw = self.no_throw;
        data.show_help = self.help;
        data.show_invisibles = self.invisibles;
        data.filenames_as_tags = self.filenames_as_tags;
        data.allow_no_match |= self.allow_no_match;

        if let Some(abort) = self.abort {
            if abort < 1 {
                return Err(Error::invalid_option("--abort", &abort.to_string()));
            }
            data.abort_after = abort;
        }
        if let Some(seed) = &self.rng_seed {
            data.rng_seed = parse_rng_seed(seed)?;
        }
        if let Some(order) = &self.order {
            data.run_order = order.parse()?;
        }
        if let Some(colour) = &self.use_colour {
            data.use_colour = colour.parse()?;
        }
        if let Some(out) = &self.out {
            data.output_filename = out.clone();
        }
        if let Some(name) = &self.name {
            data.name = name.clone();
        }
        if !self.reporter.is_empty() {
            data.reporter_names = self.reporter.clone();
        }
        if let Some(durations) = &self.durations {
            data.show_durations = durations.parse()?;
        }
        if let Some(warn) = &self.warn {
            data.warnings = warn.parse()?;
        }
        if let Some(verbosity) = &self.verbosity {
            data.verbosity = verbosity.parse()?;
        }
        if self.verbose {
            data.verbosity = crate::config::Verbosity::High;
        }

        Ok(data)
    }
}

/// A number, or "time" for a seed taken from the clock
fn parse_rng_seed(value: &str) -> Result<u32, Error> {
    if value == "time" {
        return Ok(chrono::Utc::now().timestamp() as u32);
    }
    value
        .parse()
        .map_err(|_| Error::invalid_option("--rng-seed", value))
}
