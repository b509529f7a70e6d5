//! # Edit History
//!
//! Undo / redo over the item collection, as two stacks of full snapshots.
//!
//! ## Stack Flow
//! ```text
//!   add_item(B)                 undo()                    redo()
//!   ───────────                 ──────                    ──────
//!   undo: [ [], [A] ]           undo: [ [] ]              undo: [ [], [A] ]
//!   live: [A, B]       ──►      live: [A]         ──►     live: [A, B]
//!   redo: [ ]                   redo: [ [A, B] ]          redo: [ ]
//! ```
//!
//! A receipt has tens of lines, so cloning the whole `Vec<Item>` per edit is
//! simpler than tracking diffs and costs nothing noticeable.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, HistoryAction};
use crate::types::Item;

/// Immutable copy of the item collection at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Vec<Item>);

impl Snapshot {
    pub fn capture(items: &[Item]) -> Self {
        Snapshot(items.to_vec())
    }

    pub fn items(&self) -> &[Item] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_items(self) -> Vec<Item> {
        self.0
    }
}

/// History limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum snapshots per stack. `None` keeps everything.
    pub max_depth: Option<usize>,
}

/// The undo and redo stacks.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: Option<usize>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        EditHistory {
            max_depth: config.max_depth,
            ..Self::default()
        }
    }

    /// Saves `current` before a mutation. Clears the redo stack.
    pub fn record(&mut self, current: &[Item]) {
        self.undo_stack.push(Snapshot::capture(current));
        self.redo_stack.clear();
        Self::trim(&mut self.undo_stack, self.max_depth);
    }

    /// Swaps `current` with the most recent undo snapshot.
    ///
    /// ## Errors
    /// `EmptyHistory` if there is nothing to undo; `current` is untouched.
    pub fn undo(&mut self, current: &mut Vec<Item>) -> CoreResult<()> {
        let snapshot = self.undo_stack.pop().ok_or(CoreError::EmptyHistory {
            action: HistoryAction::Undo,
        })?;
        let previous = std::mem::replace(current, snapshot.into_items());
        self.redo_stack.push(Snapshot(previous));
        Self::trim(&mut self.redo_stack, self.max_depth);
        Ok(())
    }

    /// Swaps `current` with the most recent redo snapshot.
    pub fn redo(&mut self, current: &mut Vec<Item>) -> CoreResult<()> {
        let snapshot = self.redo_stack.pop().ok_or(CoreError::EmptyHistory {
            action: HistoryAction::Redo,
        })?;
        let previous = std::mem::replace(current, snapshot.into_items());
        self.undo_stack.push(Snapshot(previous));
        Self::trim(&mut self.undo_stack, self.max_depth);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn trim(stack: &mut Vec<Snapshot>, max_depth: Option<usize>) {
        if let Some(max) = max_depth {
            if stack.len() > max {
                let excess = stack.len() - max;
                stack.drain(..excess);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
