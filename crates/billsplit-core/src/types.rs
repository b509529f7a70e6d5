//! # Domain Types
//!
//! Core domain types used throughout billsplit.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │  Participant    │   │    Category     │   │        Item         │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (UUID)      │   │  name (unique)  │   │  id (UUID)          │   │
//! │  │  name (unique)  │   │  tax_rate       │   │  unit_price, qty    │   │
//! │  └─────────────────┘   └─────────────────┘   │  category (name)    │   │
//! │                                              │  split_quantities   │   │
//! │  ┌─────────────────┐   ┌─────────────────┐   │   id → qty (f64)    │   │
//! │  │    TaxRate      │   │   ItemDraft     │   └─────────────────────┘   │
//! │  │  1e-6 (u32)     │   │  caller input   │                             │
//! │  │  80000 = 8%     │   │  by name        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Participants have an immutable `id` used as the split key and a mutable
//! display `name`. Renaming a participant never touches any item.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in millionths (1 unit = 0.0001%).
///
/// ## Why Millionths?
/// Basis points cannot hold rates like 8.125%. Millionths keep four decimal
/// places of a percentage exact:
/// 80_000 = 8%, 81_250 = 8.125%
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Units per whole percent.
    pub const UNITS_PER_PERCENT: u32 = 10_000;

    /// Creates a tax rate from millionths.
    #[inline]
    pub const fn from_millionths(millionths: u32) -> Self {
        TaxRate(millionths)
    }

    /// Creates a tax rate from a percentage.
    ///
    /// Callers validate the percentage first
    /// (see [`crate::validation::validate_tax_percentage`]), which rejects
    /// anything finer than four decimal places.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * Self::UNITS_PER_PERCENT as f64).round() as u32)
    }

    /// Returns the rate in millionths.
    #[inline]
    pub const fn millionths(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / Self::UNITS_PER_PERCENT as f64
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero (a non-taxable category).
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Stable participant identity. Split quantities are keyed by this.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        ParticipantId(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable item identity, kept across edits and undo/redo.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Participant
// =============================================================================

/// Someone who owes a share of the bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name, unique among active participants.
    pub name: String,
}

// =============================================================================
// Category
// =============================================================================

/// A named tax rate items are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub name: String,
    pub tax_rate: TaxRate,
}

impl Category {
    /// A category is taxable when its rate is above zero.
    #[inline]
    pub fn is_taxable(&self) -> bool {
        !self.tax_rate.is_zero()
    }
}

// =============================================================================
// Item
// =============================================================================

/// One purchased line and how its quantity is divided.
///
/// ## Invariants
/// - `quantity > 0`, `unit_price >= 0`
/// - `split_quantities` is non-empty; its keys are the responsible
///   participants
/// - `split_quantities` values are non-negative and sum to `quantity`
///   (within [`crate::QUANTITY_EPSILON`]) when the item is built; a participant
///   removal can leave the sum below `quantity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// Name of the category; categories are append-only so this never dangles.
    pub category: String,
    pub split_quantities: BTreeMap<ParticipantId, f64>,
    /// Excluded items stay on the bill but contribute nothing to totals.
    pub excluded: bool,
}

impl Item {
    /// `unit_price × quantity`, exact.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Participants sharing this item.
    pub fn responsible_participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.split_quantities.keys().copied()
    }

    /// Whether `participant` has a share of this item.
    pub fn is_assigned(&self, participant: ParticipantId) -> bool {
        self.split_quantities.contains_key(&participant)
    }

    /// Sum of all split quantities.
    pub fn allocated_quantity(&self) -> f64 {
        self.split_quantities.values().sum()
    }

    /// Fraction of the item owned by `participant` (0 when unassigned).
    pub fn share_of(&self, participant: ParticipantId) -> f64 {
        if self.quantity == 0 {
            return 0.0;
        }
        self.split_quantities
            .get(&participant)
            .map(|qty| qty / self.quantity as f64)
            .unwrap_or(0.0)
    }

    /// Drops `participant`'s entry from the split.
    ///
    /// Everyone else keeps their quantity, so their share of the line is
    /// unchanged and the removed share is no longer owed by anyone.
    ///
    /// Returns `true` when nobody is left, meaning the item must be removed.
    pub fn remove_participant(&mut self, participant: ParticipantId) -> bool {
        self.split_quantities.remove(&participant);
        self.split_quantities.is_empty()
    }
}

// =============================================================================
// Item Draft
// =============================================================================

/// Caller input for adding or editing an item.
///
/// Participants and the category are referenced by name; the allocation
/// engine resolves them and computes the split.
///
/// ## Example
/// ```rust
/// use billsplit_core::{ItemDraft, Money};
///
/// let draft = ItemDraft::new("Soda", Money::from_cents(250), 4)
///     .with_participants(["Alice", "Bob", "Carol"])
///     .with_explicit_quantity("Alice", 1.0);
/// assert_eq!(draft.participants.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemDraft {
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// `None` files the item under the default category.
    pub category: Option<String>,
    pub participants: Vec<String>,
    /// Participant name → quantity. Everyone else splits the remainder.
    pub explicit_quantities: BTreeMap<String, f64>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        ItemDraft {
            name: name.into(),
            unit_price,
            quantity,
            category: None,
            participants: Vec::new(),
            explicit_quantities: BTreeMap::new(),
        }
    }

    /// Builder pattern: file under a category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder pattern: responsible participants
    pub fn with_participants<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder pattern: pin one participant's quantity
    pub fn with_explicit_quantity(mut self, name: impl Into<String>, quantity: f64) -> Self {
        self.explicit_quantities.insert(name.into(), quantity);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
