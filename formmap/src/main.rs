use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use formcraft_core::mapping::report::write_report;
use formcraft_core::MappingStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formmap")]
#[command(about = "Inspect and maintain the formcraft mapping store", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the persistent mapping store (JSON)
    #[arg(short = 's', long, default_value = "mapping_store.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List current header and sheet-name mappings
    List,
    /// Add a header mapping (existing entries are never overwritten)
    AddHeader {
        /// Header text as it appears in workbooks
        raw: String,
        /// Canonical column id (e.g. col_amount)
        id: String,
    },
    /// Add a sheet-name mapping
    AddSheet {
        /// Sheet name as it appears in workbooks
        raw: String,
        /// Canonical sheet name (e.g. Invoice)
        canonical: String,
    },
    /// Write the full mapping report with unrecognized items
    Report,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut store = MappingStore::load(&cli.store)
        .with_context(|| format!("Failed to load mapping store from {}", cli.store.display()))?;

    match cli.command {
        Command::List => {
            println!("{}", "Sheet mappings:".bold());
            for (raw, canonical) in store.sheet_name_mappings() {
                println!("  '{}' -> '{}'", raw.cyan(), canonical);
            }
            println!();
            println!("{}", "Header mappings:".bold());
            for (raw, id) in store.header_mappings() {
                println!("  '{}' -> '{}'", raw.cyan(), id);
            }
        }
        Command::AddHeader { raw, id } => {
            store.add_header_mapping(&raw, &id);
            store.save().context("Failed to save mapping store")?;
            println!("{} '{}' -> '{}'", "✓ Added".green().bold(), raw, id);
        }
        Command::AddSheet { raw, canonical } => {
            store.add_sheet_mapping(&raw, &canonical);
            store.save().context("Failed to save mapping store")?;
            println!("{} '{}' -> '{}'", "✓ Added".green().bold(), raw, canonical);
        }
        Command::Report => {
            let mut stdout = std::io::stdout();
            write_report(&store, &mut stdout).context("Failed to write report")?;
        }
    }

    Ok(())
}
