//! # CSV Export
//!
//! Two formats leave the program:
//! - per-participant totals (what people owe)
//! - itemized receipt lines (what the receipt parser produced), in the same
//!   layout [`crate::import`] reads back

use std::io::Write;
use std::path::Path;

use billsplit_core::{Money, Totals};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IoResult;
use crate::receipt::ImportedReceipt;

/// Header row of the totals export.
pub const TOTALS_HEADER: [&str; 5] = [
    "Participant",
    "Total Before Tax",
    "Taxable Amount",
    "Tax Paid",
    "Total Owed",
];

/// Header row of the itemized export.
pub const ITEMIZED_HEADER: [&str; 4] = ["Item Name", "Price", "Taxable", "Quantity"];

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub currency_symbol: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            currency_symbol: "$".to_string(),
        }
    }
}

impl ExportOptions {
    /// Rounds a derived amount to the cent and formats it.
    pub fn format(&self, amount: f64) -> String {
        Money::round_from_major(amount).format_with(&self.currency_symbol)
    }
}

/// Writes one row per participant, in registration order.
///
/// ## Example
/// ```rust
/// use billsplit_core::{Bill, ItemDraft, Money};
/// use billsplit_io::export::{write_totals_csv, ExportOptions};
///
/// let mut bill = Bill::new();
/// bill.add_participant("Alice").unwrap();
/// bill.add_item(ItemDraft::new("Milk", Money::from_cents(150), 2).with_participants(["Alice"])).unwrap();
///
/// let mut out = Vec::new();
/// write_totals_csv(&mut out, &bill.calculate(0.0).unwrap(), &ExportOptions::default()).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.contains("Alice,$3.00,$0.00,$0.00,$3.00"));
/// ```
pub fn write_totals_csv<W: Write>(writer: W, totals: &Totals, options: &ExportOptions) -> IoResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TOTALS_HEADER)?;

    for person in &totals.participants {
        csv_writer.write_record([
            person.name.clone(),
            options.format(person.total_before_tax),
            options.format(person.taxable_amount),
            options.format(person.tax_paid),
            options.format(person.total_owed),
        ])?;
    }

    csv_writer.flush()?;
    debug!(rows = totals.participants.len(), "Totals exported");
    Ok(())
}

pub fn write_totals_csv_path(
    path: impl AsRef<Path>,
    totals: &Totals,
    options: &ExportOptions,
) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    write_totals_csv(file, totals, options)
}

/// Writes receipt lines plus `Subtotal` / `Total` rows when known.
///
/// Prices are written as plain decimals so the file imports again unchanged.
pub fn write_itemized_csv<W: Write>(writer: W, receipt: &ImportedReceipt) -> IoResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ITEMIZED_HEADER)?;

    for line in &receipt.items {
        csv_writer.write_record([
            line.name.clone(),
            line.unit_price.format_with(""),
            line.tax_class.clone(),
            line.quantity.to_string(),
        ])?;
    }
    for (label, amount) in [("Subtotal", receipt.subtotal), ("Total", receipt.total)] {
        if let Some(amount) = amount {
            let amount = amount.format_with("");
            csv_writer.write_record([label, amount.as_str(), "", ""])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_itemized_csv_path(path: impl AsRef<Path>, receipt: &ImportedReceipt) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    write_itemized_csv(file, receipt)
}

// =============================================================================
// Unit Tests
// =============================================================================
