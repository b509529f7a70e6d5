//! # Receipt Ingestion
//!
//! Applies an [`ImportedReceipt`] to a [`Bill`]: every line becomes an item
//! split equally among the given participants.
//!
//! ## Tax Class Resolution
//! ```text
//! line.tax_class ──► TaxClassMap hit?  ──yes──► mapped category
//!                        │ no
//!                        ▼
//!                  a category with that name?  ──yes──► that category
//!                        │ no
//!                        ▼
//!                  default (non-taxable) category
//! ```

use std::collections::BTreeMap;

use billsplit_core::allocation::allocate;
use billsplit_core::{Bill, ItemDraft, ItemId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::receipt::{ImportedReceipt, ReceiptLine};

/// Store tax class → category name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TaxClassMap(BTreeMap<String, String>);

impl TaxClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: map a class
    pub fn with(mut self, class: &str, category: &str) -> Self {
        self.insert(class, category);
        self
    }

    /// Classes are matched case-insensitively.
    pub fn insert(&mut self, class: &str, category: &str) {
        self.0
            .insert(class.trim().to_uppercase(), category.trim().to_string());
    }

    pub fn get(&self, class: &str) -> Option<&str> {
        self.0.get(&class.trim().to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Category for a receipt line in `bill`, `None` meaning the default.
    fn category_for(&self, bill: &Bill, line: &ReceiptLine) -> Option<String> {
        let class = line.tax_class.trim();
        if class.is_empty() {
            return None;
        }
        if let Some(category) = self.get(class) {
            return Some(category.to_string());
        }
        bill.categories().get(class).map(|c| c.name.clone())
    }
}

impl From<BTreeMap<String, String>> for TaxClassMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        let mut map = TaxClassMap::new();
        for (class, category) in &entries {
            map.insert(class, category);
        }
        map
    }
}

impl From<TaxClassMap> for BTreeMap<String, String> {
    fn from(map: TaxClassMap) -> Self {
        map.0
    }
}

/// Item draft for one receipt line.
fn draft_for_line(
    bill: &Bill,
    line: &ReceiptLine,
    participants: &[String],
    classes: &TaxClassMap,
) -> ItemDraft {
    let mut draft = ItemDraft::new(line.name.clone(), line.unit_price, line.quantity)
        .with_participants(participants.iter().cloned());
    draft.category = classes.category_for(bill, line);
    draft
}

/// Adds every receipt line to `bill`, shared equally by `participants`.
///
/// All lines are validated before the first one is added, so a bad line
/// leaves the bill untouched. Each added line is its own undo step.
///
/// ## Errors
/// `Ingest` naming the first line the bill rejects (unknown participant or
/// mapped category, negative price, zero quantity).
pub fn apply_receipt(
    bill: &mut Bill,
    receipt: &ImportedReceipt,
    participants: &[String],
    classes: &TaxClassMap,
) -> IoResult<Vec<ItemId>> {
    let drafts: Vec<ItemDraft> = receipt
        .items
        .iter()
        .map(|line| draft_for_line(bill, line, participants, classes))
        .collect();

    for (index, draft) in drafts.iter().enumerate() {
        allocate(draft, bill.participants(), bill.categories(), ItemId::new()).map_err(
            |source| IoError::Ingest {
                line: index + 1,
                name: draft.name.clone(),
                source,
            },
        )?;
    }

    let mut ids = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let name = draft.name.clone();
        let id = bill.add_item(draft).map_err(|source| IoError::Ingest {
            line: index + 1,
            name,
            source,
        })?;
        ids.push(id);
    }

    debug!(items = ids.len(), participants = participants.len(), "Receipt applied");
    Ok(ids)
}

// =============================================================================
// Unit Tests
// =============================================================================
