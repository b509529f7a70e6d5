//! # CLI Commands Module
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs            ◄─── You are here (Cli, dispatch)
//! ├── split.rs          ◄─── split: import + equal split + totals
//! ├── parse_receipt.rs  ◄─── parse-receipt: OCR text → itemized CSV
//! └── run.rs            ◄─── run: execute a bill script
//! ```
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  billsplit --format json split --items r.csv --participants A,B        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cli::parse ──► AppConfig::load(--config, overrides)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  split::execute(args, &config, format, stdout)                         │
//! │       │                                                                 │
//! │       ├── Ok  ──► rendered per --format on stdout, exit 0              │
//! │       └── Err ──► CliError on stderr, exit code from ErrorCode          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod parse_receipt;
pub mod run;
pub mod split;

use std::io;
use std::path::PathBuf;

use billsplit_core::DiscountMode;
use clap::{Parser, Subcommand};

use crate::error::CliResult;
use crate::state::{AppConfig, ConfigOverrides};

/// Bill splitter
#[derive(Parser, Debug)]
#[command(name = "billsplit")]
#[command(version)]
#[command(about = "Split a shared bill item by item, with tax and discounts")]
#[command(long_about = "Split a shared bill item by item.\n\n\
    Items are divided by quantity among the people responsible for them; \
    tax is charged per category and discounts reduce taxable lines.")]
pub struct Cli {
    /// Config file (env: BILLSPLIT_CONFIG)
    #[arg(short, long, env = "BILLSPLIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Which lines a discount reduces (taxable_only, uniform)
    #[arg(long, value_parser = parse_discount_mode)]
    pub discount_mode: Option<DiscountMode>,

    /// Currency symbol for tables and exports
    #[arg(long)]
    pub currency: Option<String>,

    /// First-row marker skipped on CSV import ("" disables)
    #[arg(long)]
    pub store_marker: Option<String>,

    /// Maximum undo depth
    #[arg(long)]
    pub history_depth: Option<usize>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            currency_symbol: self.currency.clone(),
            store_marker: self.store_marker.clone(),
            discount_mode: self.discount_mode,
            history_depth: self.history_depth,
        }
    }
}

fn parse_discount_mode(value: &str) -> Result<DiscountMode, String> {
    value.parse().map_err(|e: billsplit_core::ValidationError| e.to_string())
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format (human-readable)
    #[default]
    Table,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import an itemized receipt and split every item among participants
    Split(split::SplitArgs),

    /// Parse OCR receipt text into an itemized CSV
    ParseReceipt(parse_receipt::ParseReceiptArgs),

    /// Run a bill script against a fresh bill
    Run(run::RunArgs),
}

/// Loads configuration and runs the selected command on stdout.
pub fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::load(cli.config.as_deref(), &cli.overrides())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Split(args) => split::execute(args, &config, cli.format, &mut out),
        Commands::ParseReceipt(args) => parse_receipt::execute(args, &config, cli.format, &mut out),
        Commands::Run(args) => {
            let mut errors = io::stderr();
            run::execute(args, &config, cli.format, &mut out, &mut errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_help() {
        let result = Cli::try_parse_from(["billsplit", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_split_args() {
        let cli = Cli::try_parse_from([
            "billsplit",
            "--format",
            "json",
            "--discount-mode",
            "uniform",
            "split",
            "--items",
            "receipt.csv",
            "--participants",
            "Alice,Bob",
            "--discount",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.overrides().discount_mode, Some(DiscountMode::Uniform));
        match cli.command {
            Commands::Split(args) => {
                assert_eq!(args.participants, vec!["Alice".to_string(), "Bob".to_string()]);
                assert_eq!(args.discount, Some(10.0));
                assert_eq!(args.export, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bad_discount_mode_rejected() {
        let result = Cli::try_parse_from([
            "billsplit",
            "--discount-mode",
            "sometimes",
            "run",
            "--script",
            "bill.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from(["billsplit", "run", "--script", "bill.txt", "--keep-going"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.keep_going);
                assert_eq!(args.script, PathBuf::from("bill.txt"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
