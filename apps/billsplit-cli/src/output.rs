//! Output Formatting
//!
//! Renders command results as a table, JSON or CSV. Everything writes to a
//! caller-supplied `Write` so tests can render into a buffer.

use std::io::{self, Write};

use billsplit_core::Totals;
use billsplit_io::{write_itemized_csv, write_totals_csv, ImportedReceipt, IoError};
use serde::Serialize;

use crate::commands::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::script::{BillListing, ItemRow, Outcome};
use crate::state::AppConfig;

const AMOUNT_WIDTH: usize = 12;

/// Pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, data: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, data)?;
    writeln!(out)?;
    Ok(())
}

/// Renders one script or command result.
pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &Outcome,
    format: OutputFormat,
    config: &AppConfig,
) -> CliResult<()> {
    match (outcome, format) {
        (_, OutputFormat::Json) => write_json(out, outcome),
        (Outcome::Message { text }, _) => {
            writeln!(out, "{}", text)?;
            Ok(())
        }
        (Outcome::Totals(totals), _) => write_totals(out, totals, format, config),
        (Outcome::Listing(listing), _) => write_listing(out, listing, format, config),
    }
}

pub fn write_totals<W: Write>(
    out: &mut W,
    totals: &Totals,
    format: OutputFormat,
    config: &AppConfig,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(out, totals),
        OutputFormat::Csv => Ok(write_totals_csv(&mut *out, totals, &config.export_options())?),
        OutputFormat::Table => {
            totals_table(out, totals, config)?;
            Ok(())
        }
    }
}

fn totals_table<W: Write>(out: &mut W, totals: &Totals, config: &AppConfig) -> io::Result<()> {
    let money = |amount: f64| config.format_amount(amount);
    let name_width = totals
        .participants
        .iter()
        .map(|p| p.name.chars().count())
        .chain([11])
        .max()
        .unwrap_or(11);
    let rule = "-".repeat(name_width + 4 * (AMOUNT_WIDTH + 1));

    writeln!(
        out,
        "{:<nw$} {:>aw$} {:>aw$} {:>aw$} {:>aw$}",
        "Participant",
        "Before Tax",
        "Taxable",
        "Tax",
        "Total Owed",
        nw = name_width,
        aw = AMOUNT_WIDTH
    )?;
    writeln!(out, "{}", rule)?;
    for person in &totals.participants {
        writeln!(
            out,
            "{:<nw$} {:>aw$} {:>aw$} {:>aw$} {:>aw$}",
            person.name,
            money(person.total_before_tax),
            money(person.taxable_amount),
            money(person.tax_paid),
            money(person.total_owed),
            nw = name_width,
            aw = AMOUNT_WIDTH
        )?;
    }
    writeln!(out, "{}", rule)?;

    let summary = &totals.summary;
    writeln!(
        out,
        "{:<nw$} {:>aw$} {:>aw$} {:>aw$} {:>aw$}",
        "Bill",
        money(summary.total_before_tax),
        money(summary.taxable_amount),
        money(summary.tax_paid),
        money(summary.total_owed),
        nw = name_width,
        aw = AMOUNT_WIDTH
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Discount:         {}% ({})",
        round_pct(totals.discount * 100.0),
        totals.mode
    )?;
    writeln!(out, "Non-taxable:      {}", money(summary.non_taxable_amount))?;
    writeln!(out, "Before discount:  {}", money(summary.amount_before_discount))?;
    writeln!(out, "After discount:   {}", money(summary.amount_after_discount))?;
    Ok(())
}

pub fn write_listing<W: Write>(
    out: &mut W,
    listing: &BillListing,
    format: OutputFormat,
    config: &AppConfig,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(out, listing),
        OutputFormat::Csv => Ok(listing_csv(out, listing).map_err(IoError::from)?),
        OutputFormat::Table => {
            listing_table(out, listing, config)?;
            Ok(())
        }
    }
}

fn listing_table<W: Write>(out: &mut W, listing: &BillListing, config: &AppConfig) -> io::Result<()> {
    writeln!(out, "Participants: {}", join_or_none(&listing.participants))?;
    let categories: Vec<String> = listing
        .categories
        .iter()
        .map(|c| format!("{} ({}%)", c.name, round_pct(c.tax_rate_percent)))
        .collect();
    writeln!(out, "Categories:   {}", join_or_none(&categories))?;
    writeln!(
        out,
        "Discount:     {}% ({})",
        round_pct(listing.discount_percent),
        listing.discount_mode
    )?;
    writeln!(out)?;

    if listing.items.is_empty() {
        writeln!(out, "No items.")?;
    }
    for item in &listing.items {
        let flag = if item.excluded { " [excluded]" } else { "" };
        writeln!(
            out,
            "{:>3}. {} x{} @ {} ({}){}",
            item.position,
            item.name,
            item.quantity,
            item.unit_price.format_with(&config.currency_symbol),
            item.category,
            flag
        )?;
        writeln!(out, "     {}", shares_text(item))?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Undo: {}  Redo: {}",
        if listing.can_undo { "yes" } else { "no" },
        if listing.can_redo { "yes" } else { "no" }
    )?;
    Ok(())
}

/// Receipt lines as read, for `parse-receipt` without `--out`.
pub fn write_receipt<W: Write>(
    out: &mut W,
    receipt: &ImportedReceipt,
    format: OutputFormat,
    config: &AppConfig,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(out, receipt),
        OutputFormat::Csv => Ok(write_itemized_csv(&mut *out, receipt)?),
        OutputFormat::Table => {
            let symbol = &config.currency_symbol;
            for line in &receipt.items {
                writeln!(
                    out,
                    "{:<32} {:>aw$} {:>5} {}",
                    line.name,
                    line.unit_price.format_with(symbol),
                    line.quantity,
                    line.tax_class,
                    aw = AMOUNT_WIDTH
                )?;
            }
            for (label, amount) in [("SUBTOTAL", receipt.subtotal), ("TOTAL", receipt.total)] {
                if let Some(amount) = amount {
                    writeln!(out, "{:<32} {:>aw$}", label, amount.format_with(symbol), aw = AMOUNT_WIDTH)?;
                }
            }
            Ok(())
        }
    }
}

/// Reports a failure on stderr.
pub fn write_error<W: Write>(out: &mut W, err: &CliError, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = serde_json::to_string(&err.report()).map_err(io::Error::from)?;
            writeln!(out, "{}", report)
        }
        OutputFormat::Table | OutputFormat::Csv => writeln!(out, "Error: {}", err),
    }
}

fn listing_csv<W: Write>(out: W, listing: &BillListing) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(out);
    csv_writer.write_record(["Position", "Item Name", "Price", "Quantity", "Category", "Excluded", "Shares"])?;
    for item in &listing.items {
        csv_writer.write_record([
            item.position.to_string(),
            item.name.clone(),
            item.unit_price.format_with(""),
            item.quantity.to_string(),
            item.category.clone(),
            item.excluded.to_string(),
            shares_text(item),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn shares_text(item: &ItemRow) -> String {
    item.shares
        .iter()
        .map(|s| format!("{}: {}", s.participant, round_qty(s.quantity)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// `8.25`, `10`, `33.333` rather than float noise.
fn round_pct(value: f64) -> String {
    trim_float(format!("{:.3}", value))
}

fn round_qty(value: f64) -> String {
    trim_float(format!("{:.4}", value))
}

fn trim_float(text: String) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsplit_core::{Bill, ItemDraft, Money};

    fn totals() -> Totals {
        let mut bill = Bill::new();
        bill.add_participant("Alice").unwrap();
        bill.add_participant("Bob").unwrap();
        bill.add_category("Alcohol", 8.0).unwrap();
        bill.add_item(
            ItemDraft::new("Wine", Money::from_cents(1000), 1)
                .with_category("Alcohol")
                .with_participants(["Bob"]),
        )
        .unwrap();
        bill.calculate(0.10).unwrap()
    }

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_totals(&mut out, &totals(), format, &AppConfig::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_totals_table() {
        let text = render(OutputFormat::Table);
        let bob = text.lines().find(|l| l.starts_with("Bob")).unwrap();
        assert!(bob.ends_with("$9.72"));
        assert!(text.contains("Discount:         10% (taxable_only)"));
    }

    #[test]
    fn test_totals_csv_and_json() {
        let csv = render(OutputFormat::Csv);
        assert!(csv.contains("Bob,$9.00,$9.00,$0.72,$9.72"));

        let json: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(json["participants"][1]["name"], "Bob");
    }

    #[test]
    fn test_message_json_is_tagged() {
        let mut out = Vec::new();
        write_outcome(
            &mut out,
            &Outcome::message("Added participant 'Alice'"),
            OutputFormat::Json,
            &AppConfig::default(),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["kind"], "message");
        assert_eq!(json["text"], "Added participant 'Alice'");
    }

    #[test]
    fn test_error_rendering() {
        let err = CliError::invalid_arg("no participants");
        let mut out = Vec::new();
        write_error(&mut out, &err, OutputFormat::Json).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap().trim(),
            r#"{"code":"VALIDATION_ERROR","message":"Invalid argument: no participants"}"#
        );
    }

    #[test]
    fn test_trim_float() {
        assert_eq!(round_pct(8.25), "8.25");
        assert_eq!(round_pct(10.0), "10");
        assert_eq!(round_qty(1.0 / 3.0), "0.3333");
    }
}
