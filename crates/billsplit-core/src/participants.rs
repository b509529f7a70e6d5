//! # Participant Registry
//!
//! Tracks who is on the bill, in the order they were added.
//!
//! The registry only knows names and ids. Removing a participant also has to
//! reach into every item, so callers go through
//! [`Bill::remove_participant`](crate::Bill::remove_participant), which uses
//! [`ParticipantRegistry::remove`] and then cascades.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Participant, ParticipantId};
use crate::validation::validate_name;

/// Active participants, unique by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new participant and returns its id.
    ///
    /// ## Errors
    /// - `Validation` if the name is empty
    /// - `Duplicate` if an active participant already has this name
    pub fn add(&mut self, name: &str) -> CoreResult<ParticipantId> {
        let name = validate_name("participant", name)?;
        if self.id_of(&name).is_some() {
            return Err(CoreError::duplicate("Participant", name));
        }

        let id = ParticipantId::new();
        self.participants.push(Participant { id, name });
        Ok(id)
    }

    /// Changes a participant's display name.
    ///
    /// Items key their splits by id, so nothing else changes.
    pub fn rename(&mut self, old: &str, new: &str) -> CoreResult<ParticipantId> {
        let new = validate_name("participant", new)?;
        let index = self
            .index_of(old)
            .ok_or_else(|| CoreError::not_found("Participant", old.trim()))?;

        if self.participants[index].name == new {
            return Ok(self.participants[index].id);
        }
        if self.id_of(&new).is_some() {
            return Err(CoreError::duplicate("Participant", new));
        }

        self.participants[index].name = new;
        Ok(self.participants[index].id)
    }

    /// Removes a participant from the registry and returns it.
    pub fn remove(&mut self, name: &str) -> CoreResult<Participant> {
        let index = self
            .index_of(name)
            .ok_or_else(|| CoreError::not_found("Participant", name.trim()))?;
        Ok(self.participants.remove(index))
    }

    /// Looks up the id behind a display name.
    pub fn id_of(&self, name: &str) -> Option<ParticipantId> {
        self.index_of(name).map(|i| self.participants[i].id)
    }

    /// Resolves a name, failing with `NotFound`.
    pub fn resolve(&self, name: &str) -> CoreResult<ParticipantId> {
        self.id_of(name)
            .ok_or_else(|| CoreError::not_found("Participant", name.trim()))
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Display name for an id.
    pub fn name_of(&self, id: ParticipantId) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// Participants in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.participants.iter().position(|p| p.name == name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_add_and_lookup() {
        let mut registry = ParticipantRegistry::new();
        let alice = registry.add("Alice").unwrap();
        let bob = registry.add(" Bob ").unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.id_of("Alice"), Some(alice));
        assert_eq!(registry.id_of("Bob"), Some(bob));
        assert_eq!(registry.name_of(bob), Some("Bob"));

        let names: Vec<_> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut registry = ParticipantRegistry::new();
        registry.add("Alice").unwrap();

        let err = registry.add("Alice").unwrap_err();
        assert!(matches!(err, CoreError::Duplicate { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_empty_name_fails() {
        let mut registry = ParticipantRegistry::new();
        let err = registry.add("  ").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_rename_keeps_id() {
        let mut registry = ParticipantRegistry::new();
        let alice = registry.add("Alice").unwrap();

        let renamed = registry.rename("Alice", "Alicia").unwrap();
        assert_eq!(renamed, alice);
        assert_eq!(registry.id_of("Alicia"), Some(alice));
        assert_eq!(registry.id_of("Alice"), None);
    }

    #[test]
    fn test_rename_errors() {
        let mut registry = ParticipantRegistry::new();
        registry.add("Alice").unwrap();
        registry.add("Bob").unwrap();

        assert!(matches!(
            registry.rename("Carol", "Dave"),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            registry.rename("Alice", "Bob"),
            Err(CoreError::Duplicate { .. })
        ));
        // Renaming to the same name is a no-op, not a collision
        assert!(registry.rename("Alice", "Alice").is_ok());
    }

    #[test]
    fn test_remove() {
        let mut registry = ParticipantRegistry::new();
        let alice = registry.add("Alice").unwrap();

        let removed = registry.remove("Alice").unwrap();
        assert_eq!(removed.id, alice);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.remove("Alice"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_readding_gets_fresh_id() {
        let mut registry = ParticipantRegistry::new();
        let first = registry.add("Alice").unwrap();
        registry.remove("Alice").unwrap();
        let second = registry.add("Alice").unwrap();
        assert_ne!(first, second);
    }
}
