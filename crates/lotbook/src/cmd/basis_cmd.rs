//! lotbook-basis - FIFO cost basis of an exchange account statement.
//!
//! Reads the statement, books every trade oldest-lot-first and prints the
//! profit and fees realized by each sale followed by the cost basis left in
//! every account.
//!
//! # Usage
//!
//! ```bash
//! lotbook-basis account.csv
//! lotbook-basis account.csv --reference-currency EUR --format json
//! lotbook-basis account.csv --config lotbook.json -v
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lotbook_booking::{book_rows, BookingConfig, FiatConvention};
use lotbook_core::{CaseNormalization, Decimal, KindPolicy};
use lotbook_importer::{CsvConfig, ImporterConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::report;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for further processing
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Compute FIFO cost basis and realized gains from an account statement.
#[derive(Parser, Debug)]
#[command(name = "lotbook-basis")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The account statement (CSV)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// JSON configuration file (columns, reference currency, sign convention)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Currency gains and costs are expressed in
    #[arg(long, value_name = "SYMBOL")]
    reference_currency: Option<String>,

    /// Case normalization of asset symbols (lower, upper, preserve)
    #[arg(long)]
    case: Option<CaseNormalization>,

    /// Meaning of a positive reference-currency amount
    /// (inflow-is-sale, inflow-is-purchase)
    #[arg(long)]
    convention: Option<FiatConvention>,

    /// CSV delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Fail on the first invalid row instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Decimal places for money values in text output
    #[arg(long, default_value = "2")]
    precision: u32,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Contents of the `--config` file.
///
/// Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Reference currency and symbol normalization.
    pub kinds: KindPolicy,
    /// Sign convention of the reference-currency leg.
    pub convention: FiatConvention,
    /// Per-unit basis of units arriving from outside the ledger.
    pub boundary_basis: BTreeMap<String, Decimal>,
    /// Column layout of the statement.
    pub csv: CsvConfig,
}

impl FileConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Split into importer and booking configuration.
    pub fn into_parts(self) -> (ImporterConfig, BookingConfig) {
        let importer = ImporterConfig {
            kinds: self.kinds.clone(),
            csv: self.csv,
        };
        let booking = BookingConfig {
            kinds: self.kinds,
            convention: self.convention,
            boundary_basis: self.boundary_basis,
        };
        (importer, booking)
    }
}

/// Main entry point for the basis command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = apply_overrides(config, args);
    debug!(?config, "configuration");
    let (importer, booking) = config.into_parts();

    let import = importer
        .extract(&args.file)
        .with_context(|| format!("Failed to import {}", args.file.display()))?;
    for warning in &import.warnings {
        eprintln!("warning: {warning}");
    }
    info!(rows = import.rows.len(), "imported statement");

    let booked = book_rows(import.rows, &booking)
        .with_context(|| format!("Failed to book {}", args.file.display()))?;

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Text => report::render_text(&booked, args.precision, &mut stdout)?,
        OutputFormat::Json => report::render_json(&booked, &import.warnings, &mut stdout)?,
    }
    stdout.flush()?;

    Ok(())
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(mut config: FileConfig, args: &Args) -> FileConfig {
    if let Some(symbol) = &args.reference_currency {
        config.kinds.reference_currency.clone_from(symbol);
    }
    if let Some(case) = args.case {
        config.kinds.case = case;
    }
    if let Some(convention) = args.convention {
        config.convention = convention;
    }
    if let Some(delimiter) = args.delimiter {
        config.csv.delimiter = delimiter;
    }
    if args.strict {
        config.csv.strict = true;
    }
    config
}
