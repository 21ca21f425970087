//! CLI output formatting utilities.
//!
//! This module provides utilities for formatting CLI output including:
//! - Tables for tabs, commands and stack names
//! - JSON syntax highlighting

use colored::Colorize;
use serde_json::Value;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::stacking::{StackCommand, StackNames, TabRecord};

/// Maximum URL width in the tab table.
const URL_WIDTH: usize = 48;

// ============================================================================
// JSON
// ============================================================================

/// Prints JSON with syntax highlighting.
///
/// Colors:
/// - Keys: Cyan
/// - Strings: Green
/// - Numbers: Yellow
/// - Booleans/Null: Magenta
pub fn print_highlighted_json(value: &Value) {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    println!("{out}");
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().magenta().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
        Value::String(s) => out.push_str(&quote(s).green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                out.push_str(if i == 0 { "\n" } else { ",\n" });
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                out.push_str(if i == 0 { "\n" } else { ",\n" });
                indent(out, depth + 1);
                out.push_str(&quote(key).cyan().to_string());
                out.push_str(": ");
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push('}');
        }
    }
}

fn quote(s: &str) -> String { Value::String(s.to_string()).to_string() }

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Tabled)]
struct TabRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Workspace")]
    workspace: String,
    #[tabled(rename = "Stack")]
    stack: String,
    #[tabled(rename = "Pinned")]
    pinned: String,
    #[tabled(rename = "URL")]
    url: String,
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Renders tab records as a table.
///
/// Records whose metadata cannot be decoded are shown with a `?` workspace.
#[must_use]
pub fn tabs_table(records: &[TabRecord]) -> String {
    let rows: Vec<TabRow> = records
        .iter()
        .map(|record| {
            let (workspace, stack) = record.decode().map_or_else(
                |_| ("?".red().to_string(), "?".red().to_string()),
                |tab| (tab.workspace.to_string(), short_id(&tab.stack.to_string())),
            );
            TabRow {
                index: record.index,
                id: record.id.to_string(),
                workspace,
                stack,
                pinned: format_bool(record.pinned),
                url: truncate(&record.url, URL_WIDTH),
            }
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..2)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string()
}

/// Renders commands as a table, in issue order.
#[must_use]
pub fn commands_table(commands: &[StackCommand]) -> String {
    let rows: Vec<CommandRow> = commands
        .iter()
        .enumerate()
        .map(|(i, command)| {
            let (target, value) = match command {
                StackCommand::RenameStack { stack_id, label } => {
                    (short_id(stack_id.as_str()), label.clone())
                }
                StackCommand::AssignStack { tab_id, stack_id } => {
                    (format!("tab {tab_id}"), short_id(stack_id.as_str()))
                }
                StackCommand::MoveTab { tab_id, index } => {
                    (format!("tab {tab_id}"), format!("→ {index}"))
                }
            };
            CommandRow { step: i + 1, command: command.name().to_string(), target, value }
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string()
}

/// Renders the stack label map as a table.
#[must_use]
pub fn names_table(names: &StackNames) -> String {
    #[derive(Tabled)]
    struct NameRow {
        #[tabled(rename = "Stack")]
        stack: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    let rows = names
        .iter()
        .map(|(stack, name)| NameRow { stack: short_id(stack.as_str()), name: name.clone() });

    Table::new(rows).with(Style::rounded()).to_string()
}

// ============================================================================
// Formatting
// ============================================================================

/// Shortens a stack id for display, keeping its tail (the random part of a
/// UUID v7).
#[must_use]
pub fn short_id(id: &str) -> String {
    let count = id.chars().count();
    if count <= 12 {
        return id.to_string();
    }
    let tail: String = id.chars().skip(count - 8).collect();
    format!("…{tail}")
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let truncate_at = s.char_indices().nth(max_chars - 1).map_or(s.len(), |(idx, _)| idx);
    format!("{}…", &s[..truncate_at])
}

/// Formats a boolean as a colored check mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".dimmed().to_string() }
}
