//! CLI entry point for the blood-pressure logger.
//!
//! Provides subcommands for adding readings, listing them, reporting trends,
//! and moving data in and out as CSV.

use anyhow::{Context, Result};
use bp_logger::analyzers::{DEFAULT_WINDOW_DAYS, rolling_average, weekly_summary};
use bp_logger::config::StoreConfig;
use bp_logger::output::{print_pretty, render_recent, render_rolling, render_weekly, to_json};
use bp_logger::parser::parse_timestamp;
use bp_logger::reading::Reading;
use bp_logger::store::ReadingStore;
use bp_logger::transfer::{export_csv, new_readings, read_import};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bp_logger")]
#[command(about = "Log blood-pressure readings and report trends", long_about = None)]
struct Cli {
    /// Local CSV file (overrides BP_CSV_PATH)
    #[arg(long, global = true)]
    csv_path: Option<PathBuf>,

    /// Ignore spreadsheet credentials and use the local CSV only
    #[arg(long, global = true, default_value_t = false)]
    local: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a reading
    Add {
        /// Systolic pressure (mmHg)
        #[arg(short, long)]
        systolic: u16,

        /// Diastolic pressure (mmHg)
        #[arg(short, long)]
        diastolic: u16,

        /// Pulse (bpm)
        #[arg(short, long)]
        pulse: u16,

        /// Free-text notes (medication, posture, time since coffee, ...)
        #[arg(short, long)]
        notes: Option<String>,

        /// Reading time, e.g. "2024-01-02 07:45" (defaults to now)
        #[arg(long, value_name = "TIME")]
        at: Option<String>,
    },
    /// Show the most recent readings
    List {
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// Rolling averages per day
    Trends {
        /// Window size in days
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        window: u32,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Min/max/mean per ISO week
    Weekly {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write all readings to a CSV file
    Export {
        #[arg(short, long, default_value = "bp_data_export.csv")]
        output: PathBuf,

        /// Gzip compress the export
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Merge readings from a CSV file, skipping ones already stored
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show which store is in use
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bp_logger.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bp_logger.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = StoreConfig::from_env();
    if let Some(path) = cli.csv_path {
        config.csv_path = path;
    }
    if cli.local {
        config.sheets = None;
    }

    let mut store = ReadingStore::connect(&config).await;

    match cli.command {
        Commands::Add {
            systolic,
            diastolic,
            pulse,
            notes,
            at,
        } => {
            let reading = match at {
                Some(raw) => {
                    let ts = parse_timestamp(&raw)
                        .with_context(|| format!("could not understand time '{raw}'"))?;
                    Reading::at(ts, systolic, diastolic, pulse, notes)
                }
                None => Reading::now(systolic, diastolic, pulse, notes),
            };
            reading.validate()?;
            print_pretty(&reading);

            let used = store.append(&reading).await?;
            info!(store = %used, category = %reading.category(), "Reading saved");
            println!(
                "Reading saved to {used} ({}, MAP {:.1}).",
                reading.category(),
                reading.mean_arterial_pressure()
            );
        }
        Commands::List { limit } => {
            let readings = store.load_all().await?;
            print!("{}", render_recent(&readings, limit));
        }
        Commands::Trends { window, json } => {
            let readings = store.load_all().await?;
            let days = rolling_average(&readings, window);
            if json {
                println!("{}", to_json(&days)?);
            } else {
                print!("{}", render_rolling(&days, window.max(1)));
            }
        }
        Commands::Weekly { json } => {
            let readings = store.load_all().await?;
            let weeks = weekly_summary(&readings);
            if json {
                println!("{}", to_json(&weeks)?);
            } else {
                print!("{}", render_weekly(&weeks));
            }
        }
        Commands::Export { output, gzip } => {
            let readings = store.load_all().await?;
            let written = export_csv(&output, &readings, gzip)?;
            println!("Exported {} readings to {}.", readings.len(), written.display());
        }
        Commands::Import { file } => {
            let incoming = read_import(&file)?;
            let existing = store.load_all().await?;
            let incoming_count = incoming.len();

            let fresh = new_readings(&existing, incoming);
            let used = store.append_all(&fresh).await?;
            println!(
                "Imported {} of {} rows ({} already present). Total rows: {}. Saved to {}.",
                fresh.len(),
                incoming_count,
                incoming_count - fresh.len(),
                existing.len() + fresh.len(),
                used
            );
        }
        Commands::Status => {
            println!("Store: {} ({})", store.active(), store.describe());
            if let Some(sheets) = &config.sheets {
                println!(
                    "Spreadsheet: {}  Worksheet: {}",
                    sheets.spreadsheet.as_deref().unwrap_or("auto-created"),
                    sheets.worksheet
                );
            }
        }
    }

    Ok(())
}
