//! SoopBlock CLI
//!
//! CLI tool for managing block list files and checking the reconciler
//! offline.

mod perf_budget;
mod settings;
mod simulate;

use std::path::Path;

use clap::{Parser, Subcommand};

use sb_core::config::{KEY_BLOCKED_STREAMERS, KEY_BLOCKED_TAGS};
use sb_core::BlockConfig;
use sb_lists::{build_snapshot, import_snapshot, parse_snapshot, validate_snapshot};

use perf_budget::{run_perf_budget, PerfBudgetOptions};
use settings::{read_settings, read_text, write_settings, write_text};
use simulate::{run_simulate, SimulateOptions};

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(about = "SoopBlock block list tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the block lists of a settings file as an export file
    Export {
        /// Settings JSON file
        #[arg(short, long)]
        settings: String,

        /// Output export file
        #[arg(short, long, default_value = "soopblock.txt")]
        output: String,
    },

    /// Merge an export file into a settings file
    Import {
        /// Settings JSON file to update
        #[arg(short, long)]
        settings: String,

        /// Export file to merge
        #[arg(short, long)]
        input: String,

        /// Write the result here instead of over the settings file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check an export file strictly
    Validate {
        /// Export file to check
        #[arg(short, long)]
        input: String,
    },

    /// Run reconciliation passes over a card fixture
    Simulate {
        /// Settings JSON file
        #[arg(short, long)]
        settings: String,

        /// Card fixture JSON file
        #[arg(short, long)]
        cards: String,

        /// Right-click and confirm the first card with this identity
        #[arg(short, long)]
        toggle: Option<String>,

        /// Print every card
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check reconciliation pass timings against budgets
    PerfBudget {
        /// Cards in the synthetic feed
        #[arg(long, default_value_t = 500)]
        cards: usize,

        /// Samples per measurement
        #[arg(long, default_value_t = 200)]
        iterations: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export { settings, output } => cmd_export(&settings, &output),
        Commands::Import {
            settings,
            input,
            output,
        } => cmd_import(&settings, &input, output.as_deref()),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Simulate {
            settings,
            cards,
            toggle,
            verbose,
        } => run_simulate(SimulateOptions {
            settings_path: settings,
            cards_path: cards,
            toggle,
            verbose,
        }),
        Commands::PerfBudget { cards, iterations } => {
            run_perf_budget(PerfBudgetOptions { cards, iterations })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_export(settings: &str, output: &str) -> Result<(), String> {
    let config = BlockConfig::from_record(read_settings(Path::new(settings))?);
    let text = build_snapshot(&config.blocked_streamers, &config.blocked_tags);
    write_text(Path::new(output), &text)?;

    println!("Exported to '{}'", output);
    println!("  Streamers:   {}", config.blocked_streamers.len());
    println!("  Tags:        {}", config.blocked_tags.len());
    Ok(())
}

fn cmd_import(settings: &str, input: &str, output: Option<&str>) -> Result<(), String> {
    let mut record = read_settings(Path::new(settings))?;
    let parsed = parse_snapshot(&read_text(Path::new(input))?);

    let mut config = BlockConfig::from_record(record.clone());
    let report = import_snapshot(&mut config, &parsed);

    // Only the list keys change; toggles stay as they were in the file.
    record.blocked_streamers = Some(config.blocked_streamers);
    record.blocked_tags = Some(config.blocked_tags);

    let output = output.unwrap_or(settings);
    if report.changed() || output != settings {
        write_settings(Path::new(output), &record)?;
    }

    println!("Imported '{}' into '{}'", input, output);
    for line in report.summary().lines() {
        println!("  {}", line);
    }
    Ok(())
}

fn cmd_validate(input: &str) -> Result<(), String> {
    let text = read_text(Path::new(input))?;
    let parsed = validate_snapshot(&text).map_err(|e| format!("Invalid export file: {}", e))?;

    println!("Export file '{}' is valid", input);
    println!("  {}:  {}", KEY_BLOCKED_STREAMERS, parsed.streamers.len());
    println!("  {}:       {}", KEY_BLOCKED_TAGS, parsed.tags.len());
    if parsed.stats.repeated > 0 {
        println!("  Repeated:  {}", parsed.stats.repeated);
    }
    Ok(())
}
