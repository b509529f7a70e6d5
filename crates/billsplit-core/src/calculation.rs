//! # Bill Calculation Engine
//!
//! Turns the item collection into what each participant owes.
//!
//! ## Per-Line Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line_total = unit_price × quantity                                    │
//! │                                                                         │
//! │  Taxable line (rate > 0)                                               │
//! │    discounted = line_total × (1 - discount)                            │
//! │    tax        = discounted × rate                                      │
//! │                                                                         │
//! │  Non-taxable line (rate = 0)                                           │
//! │    discounted = line_total          (TaxableOnly: no discount)         │
//! │    tax        = 0                                                      │
//! │                                                                         │
//! │  Participant p with q_p of the line's quantity Q:                      │
//! │    share   = q_p / Q                                                   │
//! │    pre_tax = share × discounted                                        │
//! │    tax_p   = share × tax                                               │
//! │    total   = pre_tax + tax_p                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shares are `f64` currency units; nothing is rounded until it is displayed.
//! Calculation is read-only: the same items and discount always give the
//! same [`Totals`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::categories::CategoryRegistry;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::participants::ParticipantRegistry;
use crate::types::{Item, ItemId, ParticipantId};
use crate::validation::validate_discount;

// =============================================================================
// Discount Mode
// =============================================================================

/// Which lines a bill-wide discount applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountMode {
    /// Only taxable lines are discounted (before tax).
    #[default]
    TaxableOnly,
    /// Every line is discounted; taxable lines are then taxed.
    Uniform,
}

impl DiscountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountMode::TaxableOnly => "taxable_only",
            DiscountMode::Uniform => "uniform",
        }
    }

    fn discounts(&self, taxable: bool) -> bool {
        match self {
            DiscountMode::TaxableOnly => taxable,
            DiscountMode::Uniform => true,
        }
    }
}

impl fmt::Display for DiscountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "taxable_only" | "taxable" => Ok(DiscountMode::TaxableOnly),
            "uniform" | "all" => Ok(DiscountMode::Uniform),
            other => Err(ValidationError::InvalidFormat {
                field: "discount_mode".to_string(),
                reason: format!("unknown mode '{}' (expected taxable_only or uniform)", other),
            }),
        }
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// One participant's part of one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineShare {
    pub participant: ParticipantId,
    pub quantity: f64,
    pub pre_tax: f64,
    /// Equal to `pre_tax` on taxable lines, zero otherwise.
    pub taxable: f64,
    pub tax: f64,
    pub total: f64,
}

/// How a single line was priced and divided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineBreakdown {
    pub item_id: ItemId,
    pub item_name: String,
    pub taxable: bool,
    pub line_total: Money,
    pub discounted_total: f64,
    pub tax_amount: f64,
    pub shares: Vec<LineShare>,
}

impl LineBreakdown {
    /// What the line costs after discount and tax.
    pub fn total_with_tax(&self) -> f64 {
        self.discounted_total + self.tax_amount
    }
}

/// What one participant owes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantTotals {
    pub participant: ParticipantId,
    pub name: String,
    pub total_before_tax: f64,
    pub taxable_amount: f64,
    pub tax_paid: f64,
    pub total_owed: f64,
}

impl ParticipantTotals {
    fn zero(participant: ParticipantId, name: &str) -> Self {
        ParticipantTotals {
            participant,
            name: name.to_string(),
            total_before_tax: 0.0,
            taxable_amount: 0.0,
            tax_paid: 0.0,
            total_owed: 0.0,
        }
    }

    fn add_share(&mut self, share: &LineShare) {
        self.total_before_tax += share.pre_tax;
        self.taxable_amount += share.taxable;
        self.tax_paid += share.tax;
        self.total_owed += share.total;
    }
}

/// Bill-wide aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillSummary {
    pub total_before_tax: f64,
    pub taxable_amount: f64,
    pub non_taxable_amount: f64,
    pub tax_paid: f64,
    pub total_owed: f64,
    /// Sum of every included line total, before discount and tax.
    pub amount_before_discount: f64,
    /// Sum of every included line after discount and tax.
    pub amount_after_discount: f64,
}

/// Result of [`calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub discount: f64,
    pub mode: DiscountMode,
    /// One entry per participant, in registration order.
    pub participants: Vec<ParticipantTotals>,
    pub summary: BillSummary,
}

impl Totals {
    pub fn get(&self, participant: ParticipantId) -> Option<&ParticipantTotals> {
        self.participants
            .iter()
            .find(|t| t.participant == participant)
    }

    pub fn by_name(&self, name: &str) -> Option<&ParticipantTotals> {
        let name = name.trim();
        self.participants.iter().find(|t| t.name == name)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Prices and divides every included line.
///
/// Excluded items produce no breakdown. Shares are listed in the item's split
/// order.
pub fn line_breakdown(
    items: &[Item],
    categories: &CategoryRegistry,
    discount: f64,
    mode: DiscountMode,
) -> CoreResult<Vec<LineBreakdown>> {
    validate_discount(discount)?;

    Ok(items
        .iter()
        .filter(|item| !item.excluded)
        .map(|item| price_line(item, categories, discount, mode))
        .collect())
}

fn price_line(
    item: &Item,
    categories: &CategoryRegistry,
    discount: f64,
    mode: DiscountMode,
) -> LineBreakdown {
    let rate = categories.tax_rate_of(&item.category);
    let taxable = !rate.is_zero();
    let line_total = item.line_total();

    let discounted_total = if mode.discounts(taxable) {
        line_total.to_major() * (1.0 - discount)
    } else {
        line_total.to_major()
    };
    let tax_amount = if taxable {
        discounted_total * rate.percentage() / 100.0
    } else {
        0.0
    };

    let quantity = item.quantity as f64;
    let shares = item
        .split_quantities
        .iter()
        .map(|(&participant, &qty)| {
            if item.quantity == 0 {
                return LineShare {
                    participant,
                    quantity: qty,
                    pre_tax: 0.0,
                    taxable: 0.0,
                    tax: 0.0,
                    total: 0.0,
                };
            }
            let share = qty / quantity;
            let pre_tax = share * discounted_total;
            let tax = share * tax_amount;
            LineShare {
                participant,
                quantity: qty,
                pre_tax,
                taxable: if taxable { pre_tax } else { 0.0 },
                tax,
                total: pre_tax + tax,
            }
        })
        .collect();

    LineBreakdown {
        item_id: item.id,
        item_name: item.name.clone(),
        taxable,
        line_total,
        discounted_total,
        tax_amount,
        shares,
    }
}

/// Computes per-participant and bill-wide totals.
///
/// ## Errors
/// `Validation` if `discount` is outside `[0, 1)`.
///
/// ## Example
/// ```rust
/// use billsplit_core::calculation::{calculate, DiscountMode};
/// use billsplit_core::{allocation::allocate, CategoryRegistry, ItemDraft, ItemId, Money, ParticipantRegistry};
///
/// let mut people = ParticipantRegistry::new();
/// people.add("Alice").unwrap();
/// people.add("Bob").unwrap();
/// let categories = CategoryRegistry::new();
///
/// let milk = ItemDraft::new("Milk", Money::from_cents(150), 2).with_participants(["Alice", "Bob"]);
/// let items = vec![allocate(&milk, &people, &categories, ItemId::new()).unwrap()];
///
/// let totals = calculate(&items, &people, &categories, 0.0, DiscountMode::default()).unwrap();
/// assert!((totals.by_name("Alice").unwrap().total_owed - 1.50).abs() < 1e-9);
/// ```
pub fn calculate(
    items: &[Item],
    participants: &ParticipantRegistry,
    categories: &CategoryRegistry,
    discount: f64,
    mode: DiscountMode,
) -> CoreResult<Totals> {
    let lines = line_breakdown(items, categories, discount, mode)?;

    let mut per_participant: Vec<ParticipantTotals> = participants
        .iter()
        .map(|p| ParticipantTotals::zero(p.id, &p.name))
        .collect();
    let index: HashMap<ParticipantId, usize> = per_participant
        .iter()
        .enumerate()
        .map(|(i, t)| (t.participant, i))
        .collect();

    let mut summary = BillSummary::default();
    for line in &lines {
        summary.amount_before_discount += line.line_total.to_major();

        for share in &line.shares {
            if let Some(&i) = index.get(&share.participant) {
                per_participant[i].add_share(share);
            }

            summary.total_before_tax += share.pre_tax;
            summary.tax_paid += share.tax;
            summary.total_owed += share.total;
            if line.taxable {
                summary.taxable_amount += share.taxable;
            } else {
                summary.non_taxable_amount += share.pre_tax;
            }
        }
    }
    summary.amount_after_discount = summary.total_owed;

    Ok(Totals {
        discount,
        mode,
        participants: per_participant,
        summary,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::allocate;
    use crate::error::CoreError;
    use crate::types::ItemDraft;

    struct Fixture {
        participants: ParticipantRegistry,
        categories: CategoryRegistry,
        items: Vec<Item>,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let mut participants = ParticipantRegistry::new();
            for name in names {
                participants.add(name).unwrap();
            }
            let mut categories = CategoryRegistry::new();
            categories.add("Alcohol", 8.0).unwrap();
            Fixture {
                participants,
                categories,
                items: Vec::new(),
            }
        }

        fn add(&mut self, draft: ItemDraft) -> &mut Self {
            let item = allocate(&draft, &self.participants, &self.categories, ItemId::new()).unwrap();
            self.items.push(item);
            self
        }

        fn calc(&self, discount: f64, mode: DiscountMode) -> Totals {
            calculate(&self.items, &self.participants, &self.categories, discount, mode).unwrap()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_non_taxable_equal_split() {
        let mut f = Fixture::new(&["Alice", "Bob"]);
        f.add(ItemDraft::new("Milk", Money::from_cents(150), 2).with_participants(["Alice", "Bob"]));

        let totals = f.calc(0.0, DiscountMode::TaxableOnly);
        for name in ["Alice", "Bob"] {
            let t = totals.by_name(name).unwrap();
            assert!(approx(t.total_owed, 1.50));
            assert!(approx(t.tax_paid, 0.0));
            assert!(approx(t.taxable_amount, 0.0));
        }
        assert!(approx(totals.summary.non_taxable_amount, 3.00));
        assert!(approx(totals.summary.amount_before_discount, 3.00));
    }

    #[test]
    fn test_taxable_line_with_discount() {
        let mut f = Fixture::new(&["Alice", "Bob"]);
        f.add(
            ItemDraft::new("Wine", Money::from_cents(1000), 1)
                .with_category("Alcohol")
                .with_participants(["Bob"]),
        );

        let totals = f.calc(0.10, DiscountMode::TaxableOnly);
        let bob = totals.by_name("Bob").unwrap();
        assert!(approx(bob.total_before_tax, 9.00));
        assert!(approx(bob.taxable_amount, 9.00));
        assert!(approx(bob.tax_paid, 0.72));
        assert!(approx(bob.total_owed, 9.72));

        let alice = totals.by_name("Alice").unwrap();
        assert!(approx(alice.total_owed, 0.0));
        assert!(approx(totals.summary.amount_before_discount, 10.00));
        assert!(approx(totals.summary.amount_after_discount, 9.72));
    }

    #[test]
    fn test_discount_ignores_non_taxable_lines() {
        let mut f = Fixture::new(&["Alice"]);
        f.add(ItemDraft::new("Bread", Money::from_cents(300), 1).with_participants(["Alice"]));

        let plain = f.calc(0.0, DiscountMode::TaxableOnly);
        let discounted = f.calc(0.5, DiscountMode::TaxableOnly);
        assert_eq!(plain.participants, discounted.participants);
    }

    #[test]
    fn test_uniform_mode_discounts_everything() {
        let mut f = Fixture::new(&["Alice"]);
        f.add(ItemDraft::new("Bread", Money::from_cents(300), 1).with_participants(["Alice"]));
        f.add(
            ItemDraft::new("Wine", Money::from_cents(1000), 1)
                .with_category("Alcohol")
                .with_participants(["Alice"]),
        );

        let totals = f.calc(0.10, DiscountMode::Uniform);
        let alice = totals.by_name("Alice").unwrap();
        // 2.70 bread + 9.00 wine + 0.72 tax
        assert!(approx(alice.total_owed, 12.42));
        assert!(approx(totals.summary.non_taxable_amount, 2.70));
    }

    #[test]
    fn test_excluded_items_are_skipped() {
        let mut f = Fixture::new(&["Alice"]);
        f.add(ItemDraft::new("Bread", Money::from_cents(300), 1).with_participants(["Alice"]));
        f.items[0].excluded = true;

        let totals = f.calc(0.0, DiscountMode::TaxableOnly);
        assert!(approx(totals.by_name("Alice").unwrap().total_owed, 0.0));
        assert!(approx(totals.summary.amount_before_discount, 0.0));
        let lines = line_breakdown(&f.items, &f.categories, 0.0, DiscountMode::TaxableOnly).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_line_shares_sum_to_participant_totals() {
        let mut f = Fixture::new(&["Alice", "Bob", "Carol"]);
        f.add(
            ItemDraft::new("Soda", Money::from_cents(250), 4)
                .with_participants(["Alice", "Bob", "Carol"])
                .with_explicit_quantity("Alice", 1.0),
        );
        f.add(
            ItemDraft::new("Beer", Money::from_cents(899), 3)
                .with_category("Alcohol")
                .with_participants(["Bob", "Carol"]),
        );

        let totals = f.calc(0.15, DiscountMode::TaxableOnly);
        let lines = line_breakdown(&f.items, &f.categories, 0.15, DiscountMode::TaxableOnly).unwrap();
        for person in &totals.participants {
            let from_lines: f64 = lines
                .iter()
                .flat_map(|l| l.shares.iter())
                .filter(|s| s.participant == person.participant)
                .map(|s| s.total)
                .sum();
            assert!(approx(from_lines, person.total_owed));
        }

        let line_sum: f64 = lines.iter().map(|l| l.total_with_tax()).sum();
        assert!(approx(line_sum, totals.summary.total_owed));
    }

    #[test]
    fn test_invalid_discount() {
        let f = Fixture::new(&["Alice"]);
        let err = calculate(&f.items, &f.participants, &f.categories, 1.0, DiscountMode::TaxableOnly)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn test_participant_order_follows_registration() {
        let f = Fixture::new(&["Zed", "Amy", "Mo"]);
        let totals = f.calc(0.0, DiscountMode::TaxableOnly);
        let names: Vec<_> = totals.participants.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Amy", "Mo"]);
    }

    #[test]
    fn test_discount_mode_parsing() {
        assert_eq!("uniform".parse::<DiscountMode>().unwrap(), DiscountMode::Uniform);
        assert_eq!(
            "Taxable-Only".parse::<DiscountMode>().unwrap(),
            DiscountMode::TaxableOnly
        );
        assert!("sometimes".parse::<DiscountMode>().is_err());
        assert_eq!(DiscountMode::Uniform.to_string(), "uniform");
    }
}
