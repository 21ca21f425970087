//! Config CLI commands.
//!
//! Commands for inspecting the Autostack configuration file.

use clap::Subcommand;

use super::Cli;
use crate::cli::output;
use crate::config::config_paths;
use crate::error::AutostackError;

/// Config inspection commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Show the effective configuration.
    ///
    /// Prints the configuration after defaults are applied, and where it was
    /// loaded from.
    Show,

    /// Show the path to the configuration file.
    ///
    /// Displays the paths where Autostack looks for configuration files,
    /// and indicates which one is currently in use (if any).
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn execute(cmd: &ConfigCommands, cli: &Cli) -> Result<(), AutostackError> {
    match cmd {
        ConfigCommands::Show => show_config(cli),
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

fn show_config(cli: &Cli) -> Result<(), AutostackError> {
    let (config, source) = cli.load_config()?;
    println!("Source: {source}");
    output::print_highlighted_json(&serde_json::to_value(&config)?);
    Ok(())
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let marker = if path.exists() && !found_config {
            found_config = true;
            " (active)"
        } else if path.exists() {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found, defaults are in effect.");
    }
}
