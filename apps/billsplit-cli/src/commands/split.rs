//! # split
//!
//! One-shot split: every item on the receipt is shared equally by the
//! listed participants, then totals are printed.

use std::io::Write;
use std::path::PathBuf;

use billsplit_io::{apply_receipt, write_totals_csv_path};
use clap::Args;
use tracing::{info, warn};

use crate::commands::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::write_totals;
use crate::script::{load_receipt, subtotal_note};
use crate::state::{AppConfig, Session};

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Itemized receipt: CSV, or `.txt` receipt text
    #[arg(short, long)]
    pub items: PathBuf,

    /// Comma-separated participant names
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub participants: Vec<String>,

    /// Discount percent (default from config)
    #[arg(short, long)]
    pub discount: Option<f64>,

    /// Also write the totals CSV to this file
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

pub fn execute<W: Write>(args: &SplitArgs, config: &AppConfig, format: OutputFormat, out: &mut W) -> CliResult<()> {
    let names: Vec<String> = args
        .participants
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(CliError::invalid_arg("at least one participant is required"));
    }

    let mut bill = config.new_bill()?;
    for name in &names {
        bill.add_participant(name)?;
    }

    let receipt = load_receipt(&args.items, config)?;
    if receipt.is_empty() {
        warn!(path = %args.items.display(), "Receipt has no items");
    }
    if let Some(note) = subtotal_note(&receipt, &config.currency_symbol) {
        warn!("{}", note);
    }
    apply_receipt(&mut bill, &receipt, &names, &config.tax_class_map)?;

    let discount = args
        .discount
        .map(|pct| pct / 100.0)
        .unwrap_or_else(|| config.default_discount());
    let mut session = Session::new(bill, discount)?;
    let totals = session.totals()?;

    if let Some(path) = &args.export {
        write_totals_csv_path(path, &totals, &config.export_options())?;
        info!(path = %path.display(), participants = totals.participants.len(), "Totals exported");
    }

    write_totals(out, &totals, format, config)
}
