//! # Itemized CSV Import
//!
//! Reads the CSV produced by the receipt parser (or typed by hand):
//!
//! ```text
//! Item Name,Price,Taxable,Quantity
//! Aldi's #123 Springfield,,,          ← store row, skipped
//! Milk,3.49,F,2
//! Wine,9.99,B,                        ← quantity defaults to 1
//! Subtotal,16.97,,                    ← seeds `subtotal`
//! Total,17.77,,                       ← seeds `total`
//! ```
//!
//! The third column may be headed `Taxable`, `Category` or `Tax Class`; its
//! value is carried through as the line's tax class and resolved to a
//! category at ingestion.

use std::io::Read;
use std::path::Path;

use billsplit_core::{Money, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::receipt::{is_summary_name, ImportedReceipt, ReceiptLine};

/// Default marker identifying a store-information first row.
pub const DEFAULT_STORE_MARKER: &str = "Aldi's";

const NAME_COLUMN: &str = "Item Name";
const PRICE_COLUMN: &str = "Price";
const QUANTITY_COLUMN: &str = "Quantity";
const CLASS_COLUMNS: [&str; 3] = ["Taxable", "Category", "Tax Class"];

/// Import settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// A first data row whose name contains this text is skipped.
    /// `None` disables the check.
    pub store_marker: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            store_marker: Some(DEFAULT_STORE_MARKER.to_string()),
        }
    }
}

struct Columns {
    name: usize,
    price: usize,
    class: Option<usize>,
    quantity: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> IoResult<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };
        let missing = |column: &str| IoError::MissingColumn {
            column: column.to_string(),
        };

        Ok(Columns {
            name: find(NAME_COLUMN).ok_or_else(|| missing(NAME_COLUMN))?,
            price: find(PRICE_COLUMN).ok_or_else(|| missing(PRICE_COLUMN))?,
            class: CLASS_COLUMNS.iter().find_map(|c| find(*c)),
            quantity: find(QUANTITY_COLUMN),
        })
    }
}

fn cell<'r>(record: &'r csv::StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn parse_quantity(text: &str) -> Result<i64, ValidationError> {
    if text.is_empty() {
        return Ok(1);
    }
    if let Ok(qty) = text.parse::<i64>() {
        return Ok(qty);
    }
    // Spreadsheet exports write whole numbers as "2.0"
    match text.parse::<f64>() {
        Ok(qty) if qty.is_finite() && qty.fract() == 0.0 => Ok(qty as i64),
        _ => Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a whole number", text),
        }),
    }
}

/// Reads an itemized CSV from any reader.
///
/// ## Errors
/// - `MissingColumn` if `Item Name` or `Price` is absent
/// - `InvalidRow` for an unreadable price or quantity on an item row
/// - `Csv` for malformed CSV
pub fn read_itemized_csv<R: Read>(reader: R, options: &ImportOptions) -> IoResult<ImportedReceipt> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(csv_reader.headers()?)?;
    let mut receipt = ImportedReceipt::default();
    let mut first_row = true;

    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        let name = cell(&record, Some(columns.name));
        let is_first = std::mem::replace(&mut first_row, false);

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        if is_first {
            if let Some(marker) = options.store_marker.as_deref() {
                if !marker.is_empty() && name.contains(marker) {
                    debug!(row, name, "Store row skipped");
                    continue;
                }
            }
        }

        let price_text = cell(&record, Some(columns.price));
        if is_summary_name(name) {
            let amount = Money::parse_rounded(price_text).ok();
            if name.eq_ignore_ascii_case("subtotal") {
                receipt.subtotal = amount;
            } else {
                receipt.total = amount;
            }
            continue;
        }

        if name.is_empty() {
            return Err(IoError::InvalidRow {
                row,
                source: ValidationError::Required {
                    field: NAME_COLUMN.to_string(),
                },
            });
        }
        let unit_price = Money::parse_rounded(price_text)
            .map_err(|source| IoError::InvalidRow { row, source })?;
        let quantity = parse_quantity(cell(&record, columns.quantity))
            .map_err(|source| IoError::InvalidRow { row, source })?;

        receipt.items.push(ReceiptLine {
            name: name.to_string(),
            unit_price,
            quantity,
            tax_class: cell(&record, columns.class).to_string(),
        });
    }

    debug!(items = receipt.items.len(), "Itemized CSV imported");
    Ok(receipt)
}

/// Opens `path` and reads it with [`read_itemized_csv`].
pub fn read_itemized_csv_path(
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> IoResult<ImportedReceipt> {
    let file = std::fs::File::open(path)?;
    read_itemized_csv(file, options)
}

// =============================================================================
// Unit Tests
// =============================================================================
