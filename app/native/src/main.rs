//! Autostack - replay and inspect automatic tab stacking.
//!
//! Logging goes to stderr. The filter comes from `AUTOSTACK_LOG`
//! (`tracing_subscriber::EnvFilter` syntax), defaulting to `info`, or `debug`
//! with `--verbose`.

use autostack_lib::cli::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "AUTOSTACK_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = cli.execute() {
        eprintln!("autostack: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
