//! CLI module for Autostack.
//!
//! The CLI replays stacking passes against recorded tab strips and inspects
//! the configuration. It never talks to a running browser.

mod commands;
mod output;

pub use commands::simulate::{SimulationOutcome, simulate};
pub use commands::{Cli, SimulateArgs};
