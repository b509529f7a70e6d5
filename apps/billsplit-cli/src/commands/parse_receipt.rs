//! # parse-receipt
//!
//! Turns OCR receipt text into the itemized CSV `split` and `import` read.

use std::io::Write;
use std::path::PathBuf;

use billsplit_io::{read_receipt_text, write_itemized_csv_path};
use clap::Args;
use tracing::warn;

use crate::commands::OutputFormat;
use crate::error::CliResult;
use crate::output::{write_outcome, write_receipt};
use crate::script::Outcome;
use crate::state::AppConfig;

#[derive(Args, Debug)]
pub struct ParseReceiptArgs {
    /// Receipt text file
    #[arg(short, long)]
    pub text: PathBuf,

    /// Write the itemized CSV here instead of printing the lines
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn execute<W: Write>(
    args: &ParseReceiptArgs,
    config: &AppConfig,
    format: OutputFormat,
    out: &mut W,
) -> CliResult<()> {
    let receipt = read_receipt_text(&args.text)?;
    if receipt.is_empty() {
        warn!(path = %args.text.display(), "No receipt lines recognised");
    }

    match &args.out {
        Some(path) => {
            write_itemized_csv_path(path, &receipt)?;
            let outcome = Outcome::message(format!(
                "Wrote {} items to {}",
                receipt.items.len(),
                path.display()
            ));
            write_outcome(out, &outcome, format, config)
        }
        None => write_receipt(out, &receipt, format, config),
    }
}
