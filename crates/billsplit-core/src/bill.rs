//! # Bill Aggregate
//!
//! [`Bill`] owns everything one split needs: both registries, the item
//! collection and its edit history. Every operation goes through it.
//!
//! ## Mutation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Item Mutation Flow                                   │
//! │                                                                         │
//! │  add_item / edit_item / remove_item / set_item_excluded                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Validate (allocation engine, lookups)  ──── Err ──► nothing changed │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. history.record(items)      (snapshot of the state being left)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Apply to items                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. revision += 1              (cached totals are now stale)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Participant removal is the exception: it is not recorded and leaves the
//! stored snapshots as they are. A snapshot restored by undo or redo drops
//! entries for participants who are no longer on the bill.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::allocate;
use crate::calculation::{self, DiscountMode, LineBreakdown, Totals};
use crate::categories::CategoryRegistry;
use crate::error::{CoreError, CoreResult};
use crate::history::{EditHistory, HistoryConfig};
use crate::participants::ParticipantRegistry;
use crate::types::{Category, Item, ItemDraft, ItemId, Participant, ParticipantId};

/// Settings a bill is created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillConfig {
    pub history: HistoryConfig,
    pub discount_mode: DiscountMode,
}

/// What a participant removal took with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalReport {
    pub participant: Participant,
    /// Items that had no one left and were deleted.
    pub removed_items: Vec<Item>,
}

/// One bill being split.
#[derive(Debug, Clone)]
pub struct Bill {
    participants: ParticipantRegistry,
    categories: CategoryRegistry,
    items: Vec<Item>,
    history: EditHistory,
    discount_mode: DiscountMode,
    revision: u64,
}

impl Default for Bill {
    fn default() -> Self {
        Self::with_config(BillConfig::default())
    }
}

impl Bill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BillConfig) -> Self {
        Bill {
            participants: ParticipantRegistry::new(),
            categories: CategoryRegistry::new(),
            items: Vec::new(),
            history: EditHistory::with_config(config.history),
            discount_mode: config.discount_mode,
            revision: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.participants
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn discount_mode(&self) -> DiscountMode {
        self.discount_mode
    }

    pub fn set_discount_mode(&mut self, mode: DiscountMode) {
        if self.discount_mode != mode {
            self.discount_mode = mode;
            self.bump();
        }
    }

    /// Increases on every change that can affect totals.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Participants
    // =========================================================================

    pub fn add_participant(&mut self, name: &str) -> CoreResult<ParticipantId> {
        let id = self.participants.add(name)?;
        self.bump();
        debug!(participant_id = %id, name = name.trim(), revision = self.revision, "Participant added");
        Ok(id)
    }

    pub fn rename_participant(&mut self, old: &str, new: &str) -> CoreResult<ParticipantId> {
        let id = self.participants.rename(old, new)?;
        self.bump();
        debug!(participant_id = %id, from = old.trim(), to = new.trim(), "Participant renamed");
        Ok(id)
    }

    /// Removes a participant and cascades into every item.
    ///
    /// Their entry is dropped from each split and everyone else keeps their
    /// quantity; items left with nobody are deleted. Not undoable, and the
    /// edit history is not touched.
    pub fn remove_participant(&mut self, name: &str) -> CoreResult<RemovalReport> {
        let participant = self.participants.remove(name)?;
        let pid = participant.id;

        let mut removed_items = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for mut item in self.items.drain(..) {
            if item.remove_participant(pid) {
                removed_items.push(item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        self.bump();

        debug!(
            participant_id = %pid,
            name = %participant.name,
            removed_items = removed_items.len(),
            revision = self.revision,
            "Participant removed"
        );
        Ok(RemovalReport {
            participant,
            removed_items,
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn add_category(&mut self, name: &str, tax_rate_percent: f64) -> CoreResult<Category> {
        let category = self.categories.add(name, tax_rate_percent)?.clone();
        self.bump();
        debug!(name = %category.name, tax_rate = category.tax_rate.percentage(), "Category added");
        Ok(category)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Validates and splits a draft, then appends it.
    pub fn add_item(&mut self, draft: ItemDraft) -> CoreResult<ItemId> {
        let item = allocate(&draft, &self.participants, &self.categories, ItemId::new())?;
        let id = item.id;

        self.history.record(&self.items);
        self.items.push(item);
        self.bump();

        debug!(item_id = %id, name = %draft.name.trim(), revision = self.revision, "Item added");
        Ok(id)
    }

    /// Replaces an item with a re-validated draft, keeping its id and position.
    pub fn edit_item(&mut self, id: ItemId, draft: ItemDraft) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let mut item = allocate(&draft, &self.participants, &self.categories, id)?;
        item.excluded = self.items[index].excluded;

        self.history.record(&self.items);
        self.items[index] = item;
        self.bump();

        debug!(item_id = %id, revision = self.revision, "Item edited");
        Ok(())
    }

    pub fn remove_item(&mut self, id: ItemId) -> CoreResult<Item> {
        let index = self.index_of(id)?;

        self.history.record(&self.items);
        let item = self.items.remove(index);
        self.bump();

        debug!(item_id = %id, name = %item.name, revision = self.revision, "Item removed");
        Ok(item)
    }

    /// Includes or excludes an item from calculation. No-op if unchanged.
    pub fn set_item_excluded(&mut self, id: ItemId, excluded: bool) -> CoreResult<()> {
        let index = self.index_of(id)?;
        if self.items[index].excluded == excluded {
            return Ok(());
        }

        self.history.record(&self.items);
        self.items[index].excluded = excluded;
        self.bump();

        debug!(item_id = %id, excluded, revision = self.revision, "Item exclusion changed");
        Ok(())
    }

    fn index_of(&self, id: ItemId) -> CoreResult<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| CoreError::not_found("Item", id.to_string()))
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> CoreResult<()> {
        self.history.undo(&mut self.items)?;
        self.drop_departed_participants();
        self.bump();
        debug!(revision = self.revision, items = self.items.len(), "Undo");
        Ok(())
    }

    pub fn redo(&mut self) -> CoreResult<()> {
        self.history.redo(&mut self.items)?;
        self.drop_departed_participants();
        self.bump();
        debug!(revision = self.revision, items = self.items.len(), "Redo");
        Ok(())
    }

    /// Applies the removal cascade to restored items for anyone removed since
    /// the snapshot was taken.
    fn drop_departed_participants(&mut self) {
        let participants = &self.participants;
        let mut dropped = 0usize;
        self.items.retain_mut(|item| {
            item.split_quantities.retain(|id, _| participants.contains(*id));
            let empty = item.split_quantities.is_empty();
            dropped += usize::from(empty);
            !empty
        });
        if dropped > 0 {
            debug!(dropped, "Restored items without participants dropped");
        }
    }

    // =========================================================================
    // Calculation
    // =========================================================================

    /// Totals with the bill's discount mode.
    pub fn calculate(&self, discount: f64) -> CoreResult<Totals> {
        self.calculate_with(discount, self.discount_mode)
    }

    pub fn calculate_with(&self, discount: f64, mode: DiscountMode) -> CoreResult<Totals> {
        calculation::calculate(
            &self.items,
            &self.participants,
            &self.categories,
            discount,
            mode,
        )
    }

    pub fn line_breakdown(&self, discount: f64) -> CoreResult<Vec<LineBreakdown>> {
        calculation::line_breakdown(&self.items, &self.categories, discount, self.discount_mode)
    }

    /// Clears participants, custom categories, items and history.
    ///
    /// The revision keeps counting so stale caches stay detectable.
    pub fn reset(&mut self) {
        self.participants.clear();
        self.categories = CategoryRegistry::new();
        self.items.clear();
        self.history.clear();
        self.bump();
        debug!(revision = self.revision, "Bill reset");
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
