//! # billsplit-core: Pure Bill-Splitting Logic
//!
//! This crate is the **heart** of billsplit. It turns a list of purchased
//! items, the people sharing them and their tax categories into exactly what
//! each person owes, with undo/redo over every edit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        billsplit Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              billsplit-cli (script runner, config)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        billsplit-io (CSV import/export, receipt text)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ billsplit-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  participants  categories  allocation  calculation  history     │   │
//! │  │        └───────────┴───────────┴────── bill ──────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO TERMINAL • DETERMINISTIC               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Participant, Category, Item, TaxRate)
//! - [`money`] - Integer-cent money for prices
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`participants`] / [`categories`] - The two registries
//! - [`allocation`] - Turns an [`ItemDraft`] into a fully split [`Item`]
//! - [`calculation`] - Discount and tax math, per-participant totals
//! - [`history`] - Undo / redo snapshots
//! - [`bill`] - The [`Bill`] aggregate that owns all of the above
//!
//! ## Example Usage
//!
//! ```rust
//! use billsplit_core::{Bill, ItemDraft, Money};
//!
//! let mut bill = Bill::new();
//! bill.add_participant("Alice").unwrap();
//! bill.add_participant("Bob").unwrap();
//! bill.add_category("Alcohol", 8.0).unwrap();
//!
//! let wine = ItemDraft::new("Wine", Money::from_cents(1000), 1)
//!     .with_category("Alcohol")
//!     .with_participants(["Bob"]);
//! bill.add_item(wine).unwrap();
//!
//! let totals = bill.calculate(0.10).unwrap();
//! let bob = totals.by_name("Bob").unwrap();
//! assert!((bob.total_owed - 9.72).abs() < 1e-9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod bill;
pub mod calculation;
pub mod categories;
pub mod error;
pub mod history;
pub mod money;
pub mod participants;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill::{Bill, BillConfig, RemovalReport};
pub use calculation::{BillSummary, DiscountMode, LineBreakdown, LineShare, ParticipantTotals, Totals};
pub use categories::CategoryRegistry;
pub use error::{CoreError, CoreResult, HistoryAction, ValidationError};
pub use history::{EditHistory, HistoryConfig, Snapshot};
pub use money::Money;
pub use participants::ParticipantRegistry;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name of the category that always exists and is never taxed.
pub const DEFAULT_CATEGORY: &str = "Groceries (non-taxable)";

/// Tolerance for comparing fractional split quantities.
///
/// Splits are real-valued (a 4-pack can go 1 / 1.5 / 1.5), so sums are
/// compared with this slack instead of `==`.
pub const QUANTITY_EPSILON: f64 = 1e-9;

/// Maximum quantity of a single item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price in cents ($1,000,000.00).
///
/// ## Business Reason
/// Keeps `unit_price × quantity` and bill-wide sums far inside `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;

/// Maximum length of participant, category and item names.
pub const MAX_NAME_LENGTH: usize = 200;
