//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use meshconf_common::{InterfaceState, MeshOverview, Outcome, OutcomeStatus};
use serde::Serialize;
use tracing::error;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Could not render JSON output: {}", e);
            None
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Some(json) = render_json(value) {
        println!("{}", json);
    }
}

fn overview_table(overview: &MeshOverview) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Interface", "State"]);
    for entry in &overview.interfaces {
        table.add_row(vec![entry.interface.clone(), entry.state.to_string()]);
    }
    table
}

/// Print the mesh overview
pub fn print_overview(overview: &MeshOverview, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(overview),
        _ if overview.error.is_some() => {
            print_error(overview.error.as_deref().unwrap_or_default());
        }
        OutputFormat::Table => println!("{}", overview_table(overview)),
        OutputFormat::Plain => {
            for (label, state) in [
                ("active", InterfaceState::Active),
                ("available", InterfaceState::Available),
                ("unconfigured", InterfaceState::Unconfigured),
            ] {
                let names: Vec<&str> = overview
                    .with_state(state)
                    .map(|e| e.interface.as_str())
                    .collect();
                println!("{}: {}", label, names.join(" "));
            }
        }
    }
}

/// Print the result of an enable or disable
pub fn print_outcome(outcome: &Outcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(outcome),
        _ => match outcome.status {
            OutcomeStatus::Success => print_success(outcome.message()),
            OutcomeStatus::Offline => print_info(outcome.message()),
            OutcomeStatus::Failed => print_error(outcome.message()),
        },
    }
}

/// Print the babeld PID, if any
pub fn print_pid(pid: Option<u32>, format: OutputFormat) {
    match (format, pid) {
        (OutputFormat::Json, _) => print_json(&serde_json::json!({ "pid": pid })),
        (_, Some(pid)) => println!("{}", pid),
        (_, None) => print_info("babeld is not running"),
    }
}

/// Print a babeld command line
pub fn print_command(command: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(command),
        _ => println!("{}", command.join(" ")),
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshconf_common::InterfaceEntry;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_json_reports_failure() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1u8);
        assert_eq!(render_json(&bad), None);

        assert_eq!(render_json(&serde_json::json!({ "pid": 7 })).unwrap(), "{\n  \"pid\": 7\n}");
    }

    #[test]
    fn test_overview_table_lists_every_interface() {
        let overview = MeshOverview {
            error: None,
            interfaces: vec![
                InterfaceEntry {
                    interface: "wlan0".to_string(),
                    state: InterfaceState::Active,
                },
                InterfaceEntry {
                    interface: "wlan1".to_string(),
                    state: InterfaceState::Unconfigured,
                },
            ],
        };

        let rendered = overview_table(&overview).to_string();
        assert!(rendered.contains("wlan0"));
        assert!(rendered.contains("active"));
        assert!(rendered.contains("unconfigured"));
    }
}
