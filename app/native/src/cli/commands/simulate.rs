//! Simulate CLI command.
//!
//! Replays one navigation against a tab strip recorded as JSON, using the
//! in-memory host. The input is an array of tab records:
//!
//! ```json
//! [
//!   { "id": 1, "url": "https://mail.example.com", "index": 0, "extData": "{\"workspaceId\": 3}" },
//!   { "id": 2, "url": "https://docs.example.com", "index": 1, "pinned": true }
//! ]
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::cli::output;
use crate::config::{ConfigSource, StackingConfig};
use crate::error::AutostackError;
use crate::stacking::constants::STACK_NAME_MAP_KEY;
use crate::stacking::{
    MemoryNameStore, MemoryTabDirectory, NavigationEvent, PassReport, PlacementEngine,
    StackNames, StackingService, TabId, TabRecord,
};

/// Arguments of `autostack simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// JSON file holding the tab records of one window.
    #[arg(long, value_name = "FILE")]
    pub tabs: PathBuf,

    /// Id of the tab whose navigation triggers the pass.
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub target: i64,

    /// Output in JSON format instead of table format.
    #[arg(long, short = 'j')]
    pub json: bool,
}

/// Everything a simulated pass produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    /// False when the navigation event was ignored.
    pub triggered: bool,
    pub report: PassReport,
    pub tabs: Vec<TabRecord>,
    pub names: StackNames,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the tab file cannot be read or parsed, the target tab
/// is not part of it, or the runtime cannot be started.
pub fn execute(
    args: &SimulateArgs,
    config: StackingConfig,
    source: &ConfigSource,
) -> Result<(), AutostackError> {
    let raw = fs::read_to_string(&args.tabs)?;
    let records: Vec<TabRecord> = serde_json::from_str(&raw).map_err(|err| {
        AutostackError::InvalidArguments(format!("{}: {err}", args.tabs.display()))
    })?;

    tracing::debug!("stacking: replaying {} tabs with config from {source}", records.len());

    let outcome = simulate(records, config, TabId::new(args.target))?;

    if args.json {
        output::print_highlighted_json(&serde_json::to_value(&outcome)?);
    } else {
        print_outcome(&outcome, args.target);
    }

    Ok(())
}

/// Runs one navigation for `target` against `records`.
///
/// # Errors
///
/// Returns [`AutostackError::TabNotFound`] if no record has the target id.
pub fn simulate(
    records: Vec<TabRecord>,
    config: StackingConfig,
    target: TabId,
) -> Result<SimulationOutcome, AutostackError> {
    if !records.iter().any(|record| record.id == target) {
        return Err(AutostackError::TabNotFound(target));
    }

    let directory = Arc::new(MemoryTabDirectory::new(records));
    let names = Arc::new(MemoryNameStore::new());
    let engine = PlacementEngine::new(Arc::new(config), Arc::clone(&directory), Arc::clone(&names));
    let service = StackingService::new(engine);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    let report = runtime
        .block_on(async { service.on_navigation_committed(NavigationEvent::top_level(target)).await })
        .map_err(|err| AutostackError::CommandError(format!("pass task failed: {err}")))?;

    Ok(SimulationOutcome {
        triggered: report.is_some(),
        report: report.unwrap_or_default(),
        tabs: directory.records(),
        names: names.names(STACK_NAME_MAP_KEY),
    })
}

fn print_outcome(outcome: &SimulationOutcome, target: i64) {
    if !outcome.triggered {
        println!("{}", format!("Tab {target} does not trigger a pass.").dimmed());
    } else if outcome.report.is_noop() {
        println!("{}", "Nothing to do.".dimmed());
    } else if outcome.report.is_converged() {
        println!("{}", "Already stacked, no changes.".dimmed());
    } else {
        let report = &outcome.report;
        println!("{}", format!("Commands ({})", report.commands.len()).bold());
        println!("{}", output::commands_table(&report.commands));
        if report.failed > 0 {
            println!("{} {} commands failed", "Warning:".yellow(), report.failed);
        }
    }

    println!("{}", format!("Tabs ({})", outcome.tabs.len()).bold());
    println!("{}", output::tabs_table(&outcome.tabs));

    if !outcome.names.is_empty() {
        println!("{}", format!("Stack names ({})", outcome.names.len()).bold());
        println!("{}", output::names_table(&outcome.names));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingMode;

    fn make_record(id: i64, url: &str) -> TabRecord {
        TabRecord {
            id: TabId::new(id),
            url: url.to_string(),
            pinned: false,
            index: id as usize,
            ext_data: String::new(),
        }
    }

    fn instant_config() -> StackingConfig {
        StackingConfig { settle_delay_ms: 0, ..Default::default() }
    }

    #[test]
    fn test_simulate_gathers_target_stack() {
        let outcome = simulate(
            vec![
                make_record(0, "https://a.com"),
                make_record(1, "https://b.com"),
                make_record(2, "https://a.com"),
            ],
            instant_config(),
            TabId::new(2),
        )
        .unwrap();

        assert!(outcome.triggered);
        let order: Vec<_> = outcome.tabs.iter().map(|record| record.id.get()).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_simulate_records_names() {
        let config = StackingConfig { naming_mode: NamingMode::BaseDomain, ..instant_config() };
        let outcome =
            simulate(vec![make_record(0, "https://news.bbc.co.uk")], config, TabId::new(0)).unwrap();
        assert_eq!(outcome.names.values().next().map(String::as_str), Some("Bbc"));
    }

    #[test]
    fn test_simulate_ignored_target() {
        let mut pinned = make_record(0, "https://a.com");
        pinned.pinned = true;
        let outcome = simulate(vec![pinned], instant_config(), TabId::new(0)).unwrap();
        assert!(!outcome.triggered);
        assert!(outcome.report.is_noop());
    }

    #[test]
    fn test_simulate_unknown_target() {
        let err = simulate(vec![make_record(0, "https://a.com")], instant_config(), TabId::new(9))
            .unwrap_err();
        assert!(matches!(err, AutostackError::TabNotFound(_)));
    }
}
