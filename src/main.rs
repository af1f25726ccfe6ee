// src/main.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod aggregation;
mod category_tree;
mod csv_export;
mod custom_profile;
mod labels;
mod report_data;
mod statistics;
mod targets;


use report_data::ReportSnapshot;
use statistics::{build_report, StatisticsReport, LABEL_TOTAL};

// --- Configuration ---

#[derive(Debug, Deserialize)]
struct AppConfig {
    /// Log verbosity (error, warn, info, debug, trace). Defaults to info.
    log_level: Option<String>,
    /// Directory for CSV exports when --csv-dir is not given.
    output_dir: Option<PathBuf>,
}

impl AppConfig {
    fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        envy::prefixed("PENSUM_").from_env::<AppConfig>()
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pensum-core",
    about = "Computes work-time compliance statistics for a report period"
)]
struct Cli {
    /// Path to the report snapshot JSON (records, categories, rules, user).
    #[arg(long)]
    input: PathBuf,
    /// First day of the report period (YYYY-MM-DD).
    #[arg(long)]
    start: NaiveDate,
    /// Last day of the report period (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: NaiveDate,
    /// Write primary/remaining statistics CSV files into this directory.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to parse PENSUM_* environment")?;

    let level = config
        .log_level
        .as_deref()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    info!(
        "Computing statistics for {} .. {} from {}",
        cli.start,
        cli.end,
        cli.input.display()
    );

    let snapshot = ReportSnapshot::load(&cli.input)?;
    let (primary, remaining) =
        build_report(&snapshot, cli.start, cli.end, &labels::default_label_lookup)?;

    let csv_dir = cli.csv_dir.or(config.output_dir);
    if let Some(dir) = csv_dir {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        csv_export::write_primary_csv(
            &dir.join("primary_statistics.csv"),
            &primary,
            &labels::default_label_lookup(LABEL_TOTAL),
        )?;
        csv_export::write_remaining_csv(&dir.join("remaining_statistics.csv"), &remaining)?;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&StatisticsReport::Primary(primary))?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&StatisticsReport::Remaining(remaining))?
    );
    Ok(())
}
