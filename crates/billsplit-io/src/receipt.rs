//! # Receipt Text Parsing
//!
//! Turns OCR output into receipt lines. OCR is line-based but unreliable:
//! one item can wrap over several lines, and fields are separated by `|`
//! (or whatever the recognizer read as a column rule).
//!
//! ## Line Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "ORGANIC"                    no '|'  ──► buffer = "ORGANIC"           │
//! │  "BANANAS | 1.99 | f"         '|'     ──► "ORGANIC BANANAS | 1.99 | f" │
//! │                                           parse ok ──► item, clear     │
//! │  "GREEK | YOGURT | 4.x"       '|'     ──► parse fails ──► buffer       │
//! │  "| 4.49 | F"                 '|'     ──► buffer + line ──► item       │
//! │  <end of text>                        ──► leftover buffer tried once   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A parsable line has at least three non-empty fields: everything but the
//! last two is the name, the second-to-last is the price, the last is the tax
//! class (upper-cased). Prices with more than two decimals are rounded to
//! the cent.

use std::path::Path;

use billsplit_core::Money;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IoResult;

static SUBTOTAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)SUBTOTAL[\s|]+\$?([\d.]+)").expect("valid subtotal regex")
});

static TOTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TOTAL[\s|]+\$?([\d.]+)").expect("valid total regex"));

static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid space regex"));

/// One purchased line as read from a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// Store tax class (`A`, `B`, `F` ...) or a category name.
    pub tax_class: String,
}

/// Result of reading a receipt, from text or CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedReceipt {
    pub items: Vec<ReceiptLine>,
    /// Subtotal printed on the receipt, if found.
    pub subtotal: Option<Money>,
    /// Total printed on the receipt, if found.
    pub total: Option<Money>,
}

impl ImportedReceipt {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price × quantity` over all lines.
    pub fn items_total(&self) -> Money {
        self.items
            .iter()
            .map(|line| line.unit_price.multiply_quantity(line.quantity))
            .sum()
    }
}

/// Whether a line name is one of the receipt's summary rows.
pub(crate) fn is_summary_name(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case("subtotal") || name.eq_ignore_ascii_case("total")
}

/// Splits a `|`-delimited line into a receipt line.
fn parse_fields(line: &str) -> Option<ReceiptLine> {
    let fields: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() < 3 {
        return None;
    }

    let unit_price = Money::parse_rounded(fields[fields.len() - 2]).ok()?;
    let tax_class = fields[fields.len() - 1].to_uppercase();
    let name = fields[..fields.len() - 2].join(" ");

    Some(ReceiptLine {
        name,
        unit_price,
        quantity: 1,
        tax_class,
    })
}

/// Reads SUBTOTAL / TOTAL amounts off a line.
fn scan_totals(line: &str, receipt: &mut ImportedReceipt) {
    let upper = line.to_uppercase();
    if upper.contains("SUBTOTAL") {
        if let Some(amount) = capture_amount(&SUBTOTAL_RE, line) {
            receipt.subtotal = Some(amount);
        }
    } else if upper.contains("TOTAL") {
        if let Some(amount) = capture_amount(&TOTAL_RE, line) {
            receipt.total = Some(amount);
        }
    }
}

fn capture_amount(re: &Regex, line: &str) -> Option<Money> {
    let captures = re.captures(line)?;
    let text = captures.get(1)?.as_str().trim_end_matches('.');
    match Money::parse_rounded(text) {
        Ok(amount) => Some(amount),
        Err(err) => {
            debug!(text, error = %err, "Unreadable receipt amount");
            None
        }
    }
}

/// Parses OCR text into receipt lines plus the printed subtotal and total.
///
/// Never fails: unreadable lines are dropped and an empty input gives an
/// empty receipt. Lines named `Subtotal` / `Total` are not items.
///
/// ## Example
/// ```rust
/// use billsplit_io::receipt::parse_receipt_text;
///
/// let receipt = parse_receipt_text("MILK | 3.49 | a\nSUBTOTAL 3.49\nTOTAL $3.49");
/// assert_eq!(receipt.items.len(), 1);
/// assert_eq!(receipt.items[0].tax_class, "A");
/// assert_eq!(receipt.total.unwrap().cents(), 349);
/// ```
pub fn parse_receipt_text(text: &str) -> ImportedReceipt {
    let mut receipt = ImportedReceipt::default();
    let mut buffer = String::new();

    for raw in text.lines() {
        let collapsed = SPACES_RE.replace_all(raw.trim(), " ");
        let mut line = collapsed.into_owned();
        if line.is_empty() {
            continue;
        }

        if line.contains('|') {
            if !buffer.is_empty() {
                line = format!("{} {}", buffer.trim(), line);
                buffer.clear();
            }
            match parse_fields(&line) {
                Some(item) if is_summary_name(&item.name) => {
                    debug!(name = %item.name, "Summary row skipped");
                }
                Some(item) => receipt.items.push(item),
                None => {
                    debug!(line = %line, "Unparsed receipt line buffered");
                    buffer = line.clone();
                }
            }
        } else {
            buffer.push(' ');
            buffer.push_str(&line);
        }

        scan_totals(&line, &mut receipt);
    }

    if !buffer.trim().is_empty() {
        match parse_fields(&buffer) {
            Some(item) if !is_summary_name(&item.name) => receipt.items.push(item),
            _ => debug!(buffer = %buffer.trim(), "Leftover receipt text dropped"),
        }
    }

    debug!(
        items = receipt.items.len(),
        subtotal = ?receipt.subtotal,
        total = ?receipt.total,
        "Receipt text parsed"
    );
    receipt
}

/// Reads a text file and parses it with [`parse_receipt_text`].
pub fn read_receipt_text(path: impl AsRef<Path>) -> IoResult<ImportedReceipt> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_receipt_text(&text))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_lines() {
        let text = "\
MILK 1 GAL | 3.49 | f
BREAD   WHITE | 1.25 | F
WINE | RED | 9.99 | b";

        let receipt = parse_receipt_text(text);
        assert_eq!(receipt.items.len(), 3);
        assert_eq!(receipt.items[0].name, "MILK 1 GAL");
        assert_eq!(receipt.items[0].unit_price.cents(), 349);
        assert_eq!(receipt.items[0].tax_class, "F");
        assert_eq!(receipt.items[1].name, "BREAD WHITE");
        assert_eq!(receipt.items[2].name, "WINE RED");
        assert_eq!(receipt.items[2].tax_class, "B");
        assert!(receipt.items.iter().all(|i| i.quantity == 1));
    }

    #[test]
    fn test_wrapped_name_is_joined() {
        let receipt = parse_receipt_text("ORGANIC\nBANANAS | 1.99 | F");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].name, "ORGANIC BANANAS");
    }

    #[test]
    fn test_failed_line_is_prepended_to_next() {
        let receipt = parse_receipt_text("GREEK | YOGURT | 4.x\n| 4.49 | F");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].name, "GREEK YOGURT 4.x");
        assert_eq!(receipt.items[0].unit_price.cents(), 449);
    }

    #[test]
    fn test_leftover_buffer_tried_at_end() {
        let receipt = parse_receipt_text("EGGS | 2.99\n| F");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].name, "EGGS");

        let receipt = parse_receipt_text("THANK YOU FOR SHOPPING");
        assert!(receipt.is_empty());
    }

    #[test]
    fn test_subtotal_and_total() {
        let text = "\
MILK | 3.49 | F
SUBTOTAL | 3.49
TAX 0.00
TOTAL $3.49";

        let receipt = parse_receipt_text(text);
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.subtotal, Some(Money::from_cents(349)));
        assert_eq!(receipt.total, Some(Money::from_cents(349)));
    }

    #[test]
    fn test_summary_rows_are_not_items() {
        let receipt = parse_receipt_text("MILK | 3.49 | F\nTOTAL | 3.49 | USD");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.total, Some(Money::from_cents(349)));
    }

    #[test]
    fn test_empty_input() {
        let receipt = parse_receipt_text("");
        assert!(receipt.is_empty());
        assert_eq!(receipt.subtotal, None);
        assert_eq!(receipt.total, None);
    }

    #[test]
    fn test_items_total() {
        let receipt = parse_receipt_text("A | 1.00 | F\nB | 2.50 | F");
        assert_eq!(receipt.items_total().cents(), 350);
    }

    #[test]
    fn test_extra_price_decimals_round_to_cents() {
        let receipt = parse_receipt_text("LIMES | 0.335 | F\nSUBTOTAL 0.335");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].unit_price.cents(), 34);
        assert_eq!(receipt.subtotal.unwrap().cents(), 34);
    }
}
