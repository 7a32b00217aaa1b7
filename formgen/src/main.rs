use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use formcraft_core::heuristics::all_rule_ids;
use formcraft_core::{
    AutoConfirm, Confirmation, ConfigSynthesizer, ConfirmationPort, EventLog, MappingStore,
    ToolConfig,
};
use std::io::Write;
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "formgen")]
#[command(about = "Analyzes a filled-in shipping workbook and generates a layout configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the Excel workbook to analyze
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Path to the persistent mapping store (JSON)
    #[arg(short = 's', long, default_value = "mapping_store.json")]
    store: PathBuf,

    /// Output file for the generated configuration
    #[arg(short, long, default_value = "form_config.json")]
    output: PathBuf,

    /// Prompt for unrecognized headers instead of dropping them
    #[arg(short, long)]
    interactive: bool,

    /// Output format for the event report
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for CI/CD integration
    Json,
}

/// Terminal prompt for mapping suggestions
struct StdinConfirmation;

impl ConfirmationPort for StdinConfirmation {
    fn propose(&mut self, text: &str, suggestion: &str) -> Confirmation {
        print!("Map '{}' -> '{}'? [y]es / [n]o / [s]ave: ", text, suggestion);
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return Confirmation::Reject;
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Accept,
            "s" | "save" => Confirmation::AcceptAndPersist,
            _ => Confirmation::Reject,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        ToolConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("formgen.toml");
        if default_config_path.exists() {
            ToolConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ToolConfig::default()
        }
    };

    config
        .validate_rules(&all_rule_ids())
        .context("Invalid configuration")?;

    let mut store = MappingStore::load(&cli.store)
        .with_context(|| format!("Failed to load mapping store from {}", cli.store.display()))?;

    let workbook = formcraft_core::read_workbook(&cli.file)
        .with_context(|| format!("Failed to read workbook: {}", cli.file.display()))?;

    let synthesizer = ConfigSynthesizer::new(&config, cli.interactive);
    let mut events = EventLog::new();

    let artifact = if cli.interactive {
        let mut port = StdinConfirmation;
        synthesizer.synthesize(&workbook, &mut store, &mut port, &mut events)
    } else {
        let mut port = AutoConfirm::rejecting();
        synthesizer.synthesize(&workbook, &mut store, &mut port, &mut events)
    };

    // Confirmed mappings are kept for the next run
    if cli.interactive {
        store
            .save()
            .with_context(|| format!("Failed to save mapping store to {}", cli.store.display()))?;
    }

    let json = artifact
        .to_json()
        .context("Failed to serialize configuration")?;
    std::fs::write(&cli.output, json)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    match cli.format {
        OutputFormat::Human => {
            formatter::print_human(&cli.file, &cli.output, &artifact, &events);
        }
        OutputFormat::Json => {
            formatter::print_json(&cli.file, &artifact, &events)?;
        }
    }

    let exit_code = if events.has_errors() { 1 } else { 0 };
    std::process::exit(exit_code);
}
