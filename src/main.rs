// Main entry point for tapline

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tapline::cli::Cli;
use tapline::commands;
use tapline::config::{ConfigFile, RunConfiguration};
use tapline::logging;
use tapline::report::ReporterRegistry;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    if let Some(path) = &cli.init_config {
        commands::handle_init_config(path)?;
        return Ok(0);
    }
    if let Some(shell_type) = &cli.completion {
        commands::handle_completion(shell_type)?;
        return Ok(0);
    }

    let file_config = ConfigFile::load()?;
    let data = cli.config_data(file_config.as_ref())?;
    logging::init(data.verbosity);
    info!("Starting tapline v{}", env!("CARGO_PKG_VERSION"));

    let registry = ReporterRegistry::with_builtins();
    let config = RunConfiguration::with_reporters(data, &registry)?;
    if config.show_help() {
        commands::handle_help()?;
        return Ok(0);
    }

    let tests = commands::load_test_cases(&config, cli.suite.as_deref())?;

    let code = if commands::is_listing(&config) {
        commands::handle_list(&config, &registry, &tests)?;
        0
    } else {
        commands::run_tests(&config, &registry, &tests)?.exit_code()
    };

    // The output stream flushes when the configuration is dropped
    drop(config);
    Ok(code)
}
