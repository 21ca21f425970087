//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration inspection commands
//! - `simulate` - Replays a stacking pass against a recorded tab strip

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, ConfigSource, StackingConfig};
use crate::error::AutostackError;
use crate::schema;

pub mod config_cmd;
pub mod simulate;

pub use config_cmd::ConfigCommands;
pub use simulate::SimulateArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Autostack CLI - groups browser tabs into stacks by hostname.
#[derive(Parser, Debug)]
#[command(name = "autostack")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable debug logging.
    ///
    /// `AUTOSTACK_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Replay one stacking pass against a recorded tab strip.
    ///
    /// Loads a JSON array of tab records, delivers a top-level navigation
    /// event for the target tab and prints the issued commands together with
    /// the resulting strip.
    Simulate(SimulateArgs),

    /// Configuration file inspection commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output Autostack configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(autostack completions --shell zsh)"
    ///   autostack completions --shell bash > ~/.local/share/bash-completion/completions/autostack
    ///   autostack completions --shell fish > ~/.config/fish/completions/autostack.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Loads the configuration, honouring `--config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file does not exist or any config
    /// file fails to load.
    pub fn load_config(&self) -> Result<(StackingConfig, ConfigSource), AutostackError> {
        let path = self.config_path();
        if let Some(path) = &path
            && !path.exists()
        {
            return Err(AutostackError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        Ok(config::resolve_config(path.as_deref())?)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), AutostackError> {
        match &self.command {
            Commands::Simulate(args) => {
                let (config, source) = self.load_config()?;
                simulate::execute(args, config, &source)
            }
            Commands::Config(cmd) => config_cmd::execute(cmd, self),

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "autostack", &mut io::stdout());
    }
}
