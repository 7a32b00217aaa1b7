//! Output formatters for the analysis event report

use anyhow::Result;
use colored::*;
use formcraft_core::{ConfigArtifact, EventLevel, EventLog, EventScope, InferenceEvent};
use std::collections::BTreeMap;
use std::path::Path;

/// Print the run report in human-readable format with colors and hierarchy
pub fn print_human(file_path: &Path, output_path: &Path, artifact: &ConfigArtifact, events: &EventLog) {
    println!("{}", format!("Analyzing: {}", file_path.display()).bold());
    println!();

    if artifact.data_mapping.is_empty() {
        println!("{}", "✗ No sheet configurations generated".red().bold());
    } else {
        println!(
            "{} {}",
            "✓ Configurations written to".green().bold(),
            output_path.display()
        );
        for sheet_name in artifact.data_mapping.keys() {
            println!("    - {}", sheet_name.cyan());
        }
    }
    println!();

    if events.is_empty() {
        println!("{}", "No inference events recorded.".bright_black());
        return;
    }

    // Group events by scope for hierarchical display
    let mut book_events = Vec::new();
    let mut sheet_events: BTreeMap<String, Vec<&InferenceEvent>> = BTreeMap::new();

    for event in events.events() {
        match event.scope.sheet_name() {
            None => book_events.push(event),
            Some(sheet) => {
                sheet_events.entry(sheet.to_string()).or_default().push(event);
            }
        }
    }

    if !book_events.is_empty() {
        println!("{}", "Workbook:".bold().underline());
        for event in book_events {
            print_event(event, 1);
        }
        println!();
    }

    for (sheet_name, events) in &sheet_events {
        println!("{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for event in events {
            print_event(event, 1);
        }
        println!();
    }

    let error_count = count(events, EventLevel::Error);
    let warning_count = count(events, EventLevel::Warning);
    let info_count = count(events, EventLevel::Info);

    println!("{}", "Summary:".bold().underline());
    if error_count > 0 {
        println!("  {} {}", "Errors:".red().bold(), error_count);
    }
    if warning_count > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), warning_count);
    }
    if info_count > 0 {
        println!("  {} {}", "Info:".blue().bold(), info_count);
    }
}

fn count(events: &EventLog, level: EventLevel) -> usize {
    events.events().iter().filter(|e| e.level == level).count()
}

fn print_event(event: &InferenceEvent, indent: usize) {
    let indent_str = "  ".repeat(indent);
    let level_str = match event.level {
        EventLevel::Error => "ERROR".red().bold(),
        EventLevel::Warning => "WARN".yellow().bold(),
        EventLevel::Info => "INFO".blue().bold(),
    };

    let cell_suffix = match &event.scope {
        EventScope::Cell(_, cell_ref) => format!(" @{}", cell_ref),
        _ => String::new(),
    };

    println!(
        "{}{} [{}] {}{}",
        indent_str,
        level_str,
        event.component.bright_black(),
        event.message,
        cell_suffix
    );
}

/// Print the run report in JSON format
pub fn print_json(file_path: &Path, artifact: &ConfigArtifact, events: &EventLog) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "sheets": artifact.data_mapping.keys().collect::<Vec<_>>(),
        "events": events.events(),
        "summary": {
            "total": events.events().len(),
            "errors": count(events, EventLevel::Error),
            "warnings": count(events, EventLevel::Warning),
            "info": count(events, EventLevel::Info),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
