//! # Allocation Engine
//!
//! Turns an [`ItemDraft`] (names and numbers typed by a user or read off a
//! receipt) into a fully split [`Item`].
//!
//! ## Split Rule
//! ```text
//! Soda, qty 4, participants {Alice, Bob, Carol}, explicit {Alice: 1}
//!
//!   explicit:     Alice ─────────────► 1.0
//!   remainder:    4 - 1 = 3
//!   unspecified:  {Bob, Carol} ──3/2─► 1.5 each
//!
//!   split_quantities = {Alice: 1.0, Bob: 1.5, Carol: 1.5}   (sum = 4)
//! ```
//!
//! Everything is checked before the item is built, so a rejected draft never
//! leaves anything half-applied.

use std::collections::BTreeMap;

use crate::categories::CategoryRegistry;
use crate::error::{CoreResult, ValidationError};
use crate::participants::ParticipantRegistry;
use crate::types::{Item, ItemDraft, ItemId, ParticipantId};
use crate::validation::{validate_name, validate_price, validate_quantity, validate_split_quantity};
use crate::QUANTITY_EPSILON;

/// Validates `draft` against the registries and computes its split.
///
/// `id` is the identity the resulting item carries: a fresh one for a new
/// item, the existing one for an edit.
///
/// ## Errors
/// - `Validation` for bad names, prices, quantities or explicit splits
/// - `NotFound` for an unknown category or participant
pub fn allocate(
    draft: &ItemDraft,
    participants: &ParticipantRegistry,
    categories: &CategoryRegistry,
    id: ItemId,
) -> CoreResult<Item> {
    let name = validate_name("item name", &draft.name)?;
    validate_price(draft.unit_price)?;
    validate_quantity(draft.quantity)?;

    let category = categories.resolve(draft.category.as_deref())?.name.clone();

    // Responsible participants, in draft order, duplicates collapsed
    let mut responsible: Vec<ParticipantId> = Vec::with_capacity(draft.participants.len());
    for participant in &draft.participants {
        let pid = participants.resolve(participant)?;
        if !responsible.contains(&pid) {
            responsible.push(pid);
        }
    }
    if responsible.is_empty() {
        return Err(ValidationError::Required {
            field: "participants".to_string(),
        }
        .into());
    }

    let mut explicit: BTreeMap<ParticipantId, f64> = BTreeMap::new();
    for (participant, &qty) in &draft.explicit_quantities {
        validate_split_quantity(participant.trim(), qty)?;
        let pid = participants.resolve(participant)?;
        if !responsible.contains(&pid) {
            return Err(ValidationError::NotAssigned {
                item: name,
                participant: participant.trim().to_string(),
            }
            .into());
        }
        explicit.insert(pid, qty);
    }

    let quantity = draft.quantity as f64;
    let explicit_sum: f64 = explicit.values().sum();
    if explicit_sum > quantity + QUANTITY_EPSILON {
        return Err(ValidationError::OverAllocated {
            item: name,
            allocated: explicit_sum,
            quantity: draft.quantity,
        }
        .into());
    }

    let unspecified: Vec<ParticipantId> = responsible
        .iter()
        .copied()
        .filter(|pid| !explicit.contains_key(pid))
        .collect();
    let remainder = (quantity - explicit_sum).max(0.0);

    if unspecified.is_empty() && remainder > QUANTITY_EPSILON {
        return Err(ValidationError::UnallocatedQuantity {
            item: name,
            remaining: remainder,
        }
        .into());
    }

    let mut split_quantities = explicit;
    if let Some((&last, rest)) = unspecified.split_last() {
        let each = remainder / unspecified.len() as f64;
        for &pid in rest {
            split_quantities.insert(pid, each);
        }
        // The last one takes whatever rounding left over
        let absorbed = remainder - each * rest.len() as f64;
        split_quantities.insert(last, absorbed.max(0.0));
    }

    Ok(Item {
        id,
        name,
        unit_price: draft.unit_price,
        quantity: draft.quantity,
        category,
        split_quantities,
        excluded: false,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::money::Money;

    struct Fixture {
        participants: ParticipantRegistry,
        categories: CategoryRegistry,
        alice: ParticipantId,
        bob: ParticipantId,
        carol: ParticipantId,
    }

    fn fixture() -> Fixture {
        let mut participants = ParticipantRegistry::new();
        let alice = participants.add("Alice").unwrap();
        let bob = participants.add("Bob").unwrap();
        let carol = participants.add("Carol").unwrap();
        let mut categories = CategoryRegistry::new();
        categories.add("Alcohol", 8.0).unwrap();
        Fixture {
            participants,
            categories,
            alice,
            bob,
            carol,
        }
    }

    fn run(f: &Fixture, draft: &ItemDraft) -> CoreResult<Item> {
        allocate(draft, &f.participants, &f.categories, ItemId::new())
    }

    #[test]
    fn test_equal_split() {
        let f = fixture();
        let draft = ItemDraft::new("Milk", Money::from_cents(150), 2)
            .with_participants(["Alice", "Bob"]);

        let item = run(&f, &draft).unwrap();
        assert_eq!(item.split_quantities.len(), 2);
        assert!((item.split_quantities[&f.alice] - 1.0).abs() < 1e-12);
        assert!((item.split_quantities[&f.bob] - 1.0).abs() < 1e-12);
        assert_eq!(item.category, crate::DEFAULT_CATEGORY);
        assert!(!item.excluded);
    }

    #[test]
    fn test_explicit_plus_remainder() {
        let f = fixture();
        let draft = ItemDraft::new("Soda", Money::from_cents(250), 4)
            .with_participants(["Alice", "Bob", "Carol"])
            .with_explicit_quantity("Alice", 1.0);

        let item = run(&f, &draft).unwrap();
        assert!((item.split_quantities[&f.alice] - 1.0).abs() < 1e-12);
        assert!((item.split_quantities[&f.bob] - 1.5).abs() < 1e-12);
        assert!((item.split_quantities[&f.carol] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_three_way_split_sums_exactly() {
        let f = fixture();
        let draft = ItemDraft::new("Chips", Money::from_cents(199), 1)
            .with_participants(["Alice", "Bob", "Carol"]);

        let item = run(&f, &draft).unwrap();
        assert!((item.allocated_quantity() - 1.0).abs() < QUANTITY_EPSILON);
    }

    #[test]
    fn test_all_explicit_exact() {
        let f = fixture();
        let draft = ItemDraft::new("Soda", Money::from_cents(250), 4)
            .with_participants(["Alice", "Bob"])
            .with_explicit_quantity("Alice", 3.0)
            .with_explicit_quantity("Bob", 1.0);

        let item = run(&f, &draft).unwrap();
        assert!((item.split_quantities[&f.alice] - 3.0).abs() < 1e-12);
        assert!((item.split_quantities[&f.bob] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_over_allocation_rejected() {
        let f = fixture();
        let draft = ItemDraft::new("Soda", Money::from_cents(250), 4)
            .with_participants(["Alice"])
            .with_explicit_quantity("Alice", 5.0);

        let err = run(&f, &draft).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OverAllocated { quantity: 4, .. })
        ));
    }

    #[test]
    fn test_leftover_without_unspecified_rejected() {
        let f = fixture();
        let draft = ItemDraft::new("Soda", Money::from_cents(250), 4)
            .with_participants(["Alice", "Bob"])
            .with_explicit_quantity("Alice", 1.0)
            .with_explicit_quantity("Bob", 1.0);

        let err = run(&f, &draft).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnallocatedQuantity { .. })
        ));
    }

    #[test]
    fn test_explicit_for_unassigned_participant() {
        let f = fixture();
        let draft = ItemDraft::new("Soda", Money::from_cents(250), 4)
            .with_participants(["Alice"])
            .with_explicit_quantity("Bob", 1.0);

        assert!(matches!(
            run(&f, &draft).unwrap_err(),
            CoreError::Validation(ValidationError::NotAssigned { .. })
        ));
    }

    #[test]
    fn test_unknown_references() {
        let f = fixture();
        let unknown_person =
            ItemDraft::new("Soda", Money::from_cents(250), 1).with_participants(["Dave"]);
        assert!(matches!(
            run(&f, &unknown_person),
            Err(CoreError::NotFound { .. })
        ));

        let unknown_category = ItemDraft::new("Soap", Money::from_cents(250), 1)
            .with_category("Household")
            .with_participants(["Alice"]);
        assert!(matches!(
            run(&f, &unknown_category),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_basic_field_validation() {
        let f = fixture();
        let base = || ItemDraft::new("Soda", Money::from_cents(250), 1).with_participants(["Alice"]);

        let mut draft = base();
        draft.name = "  ".to_string();
        assert!(run(&f, &draft).is_err());

        let mut draft = base();
        draft.unit_price = Money::from_cents(-1);
        assert!(run(&f, &draft).is_err());

        let mut draft = base();
        draft.quantity = 0;
        assert!(run(&f, &draft).is_err());

        let draft = ItemDraft::new("Soda", Money::from_cents(250), 1);
        assert!(matches!(
            run(&f, &draft),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let draft = base().with_explicit_quantity("Alice", -1.0);
        assert!(run(&f, &draft).is_err());
    }

    #[test]
    fn test_duplicate_participants_collapse() {
        let f = fixture();
        let draft = ItemDraft::new("Milk", Money::from_cents(150), 2)
            .with_participants(["Alice", "Alice", " Alice "]);

        let item = run(&f, &draft).unwrap();
        assert_eq!(item.split_quantities.len(), 1);
        assert!((item.split_quantities[&f.alice] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_category_is_resolved() {
        let f = fixture();
        let draft = ItemDraft::new("Wine", Money::from_cents(1000), 1)
            .with_category("Alcohol")
            .with_participants(["Bob"]);
        let item = run(&f, &draft).unwrap();
        assert_eq!(item.category, "Alcohol");
    }
}
