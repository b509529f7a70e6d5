//! What a script command hands back for printing.

use billsplit_core::{Bill, DiscountMode, Money, Totals};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Message { text: String },
    Totals(Totals),
    Listing(BillListing),
}

impl Outcome {
    pub fn message(text: impl Into<String>) -> Self {
        Outcome::Message { text: text.into() }
    }
}

/// Everything on the bill, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillListing {
    pub participants: Vec<String>,
    pub categories: Vec<CategoryRow>,
    pub items: Vec<ItemRow>,
    pub discount_percent: f64,
    pub discount_mode: DiscountMode,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub tax_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    /// 1-based, as item commands address it
    pub position: usize,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub category: String,
    pub excluded: bool,
    pub shares: Vec<ShareRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub participant: String,
    pub quantity: f64,
}

impl BillListing {
    pub fn from_bill(bill: &Bill, discount: f64) -> Self {
        let participants = bill.participants();
        let items = bill
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| ItemRow {
                position: index + 1,
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                category: item.category.clone(),
                excluded: item.excluded,
                shares: participants
                    .iter()
                    .filter_map(|p| {
                        item.split_quantities.get(&p.id).map(|&quantity| ShareRow {
                            participant: p.name.clone(),
                            quantity,
                        })
                    })
                    .collect(),
            })
            .collect();

        BillListing {
            participants: participants.iter().map(|p| p.name.clone()).collect(),
            categories: bill
                .categories()
                .iter()
                .map(|c| CategoryRow {
                    name: c.name.clone(),
                    tax_rate_percent: c.tax_rate.percentage(),
                })
                .collect(),
            items,
            discount_percent: discount * 100.0,
            discount_mode: bill.discount_mode(),
            can_undo: bill.can_undo(),
            can_redo: bill.can_redo(),
        }
    }
}
