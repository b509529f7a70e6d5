//! # Error Types
//!
//! Domain-specific error types for billsplit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billsplit-core errors (this file)                                     │
//! │  ├── CoreError        - Registry, lookup and history failures          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  billsplit-io errors (separate crate)                                  │
//! │  └── IoError          - File / CSV failures                            │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the user sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → stderr / exit code     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (participant, item, field)
//! 3. Errors are enum variants, never String
//! 4. Every error is recoverable: nothing was mutated when one is returned

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every operation validates before it applies, so receiving any of these
/// means the bill is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A name collides with an active entry of the registry.
    ///
    /// ## When This Occurs
    /// - Adding a participant whose name is already active
    /// - Renaming a participant to a name that is taken
    #[error("{entity} '{name}' already exists")]
    Duplicate { entity: String, name: String },

    /// The referenced participant, category or item does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// Undo or redo was requested with nothing on the matching stack.
    #[error("Nothing to {action}")]
    EmptyHistory { action: HistoryAction },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(entity: &str, key: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.to_string(),
            key: key.into(),
        }
    }

    /// Creates a duplicate error.
    pub fn duplicate(entity: &str, name: impl Into<String>) -> Self {
        CoreError::Duplicate {
            entity: entity.to_string(),
            name: name.into(),
        }
    }
}

/// Which history direction an [`CoreError::EmptyHistory`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::Undo => f.write_str("undo"),
            HistoryAction::Redo => f.write_str("redo"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., unparseable price, NaN quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate category name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Explicit split quantities add up to more than the item quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Item "Soda" qty 4, explicit { Alice: 5 }
    ///      │
    ///      ▼
    /// OverAllocated { item: "Soda", allocated: 5, quantity: 4 }
    ///      │
    ///      ▼
    /// Item collection unchanged
    /// ```
    #[error("Split quantities for '{item}' add up to {allocated}, more than its quantity {quantity}")]
    OverAllocated {
        item: String,
        allocated: f64,
        quantity: i64,
    },

    /// Every participant has an explicit quantity but they do not cover the
    /// whole item, and nobody is left to absorb the remainder.
    #[error("Split quantities for '{item}' leave {remaining} unassigned")]
    UnallocatedQuantity { item: String, remaining: f64 },

    /// An explicit quantity names someone who is not responsible for the item.
    #[error("{participant} is not assigned to '{item}'")]
    NotAssigned { item: String, participant: String },

    /// Discount is outside `[0, 1)`.
    #[error("Discount must be in [0, 1), got {value}")]
    InvalidDiscount { value: f64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::duplicate("Participant", "Alice");
        assert_eq!(err.to_string(), "Participant 'Alice' already exists");

        let err = CoreError::not_found("Item", "42");
        assert_eq!(err.to_string(), "Item not found: 42");

        let err = CoreError::EmptyHistory {
            action: HistoryAction::Redo,
        };
        assert_eq!(err.to_string(), "Nothing to redo");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OverAllocated {
            item: "Soda".to_string(),
            allocated: 5.0,
            quantity: 4,
        };
        assert_eq!(
            err.to_string(),
            "Split quantities for 'Soda' add up to 5, more than its quantity 4"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Negative {
            field: "tax_rate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
