// Commands module - handles CLI command execution

use anyhow::{Context, Result};
use std::path::Path;

pub mod list;
pub mod run;

pub use list::{handle_list, is_listing};
pub use run::{load_test_cases, run_tests};

use crate::config::ConfigFile;

/// Handle shell completion
pub fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Supported: bash, zsh, fish, elvish, powershell",
                shell_type
            );
        }
    };

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();

    generate(shell, &mut cmd, name, &mut stdout);

    Ok(())
}

/// Write a default configuration file
pub fn handle_init_config(path: &Path) -> Result<()> {
    let content = ConfigFile::default().to_toml();
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
    println!("Configuration file created: {}", path.display());
    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Configuration file");
    println!("  3. Built-in defaults (lowest)");
    Ok(())
}

/// Print command-line help
pub fn handle_help() -> Result<()> {
    use clap::CommandFactory;

    crate::cli::Cli::command()
        .print_long_help()
        .context("Failed to print help")
}
