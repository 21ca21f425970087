//! Autostack - automatic browser tab stacking by hostname.
//!
//! This library provides the stacking engine, its configuration, and the CLI
//! used to replay passes against a recorded tab strip.

pub mod cli;
pub mod config;
pub mod error;
pub mod schema;
pub mod stacking;
