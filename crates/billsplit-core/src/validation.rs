//! # Validation Module
//!
//! Input validation for every value that enters the bill.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Adapters (billsplit-io, CLI)                                 │
//! │  ├── Text → number parsing                                             │
//! │  └── Row / line context in error messages                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, prices, quantities, tax rates, discounts                   │
//! │  └── Called before any state is touched                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Allocation engine                                            │
//! │  └── Cross-field rules (over-allocation, unassigned remainder)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use billsplit_core::validation::validate_name;
///
/// assert_eq!(validate_name("participant", "  Alice ").unwrap(), "Alice");
/// assert!(validate_name("participant", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, coupons already netted out)
/// - At most [`MAX_UNIT_PRICE_CENTS`]
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if price.cents() > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price (cents)".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a tax rate given as a percentage (`8.25` = 8.25%).
///
/// ## Rules
/// - Must be a finite number
/// - Must be >= 0
/// - At most four decimal places (`8.125` is fine, `8.12345` is not)
/// - Must fit in a [`TaxRate`]
pub fn validate_tax_percentage(pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "tax_rate".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if pct < 0.0 {
        return Err(ValidationError::Negative {
            field: "tax_rate".to_string(),
        });
    }

    let units = pct * TaxRate::UNITS_PER_PERCENT as f64;
    if units > u32::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: (u32::MAX / TaxRate::UNITS_PER_PERCENT) as i64,
        });
    }

    if (units - units.round()).abs() > 1e-6 {
        return Err(ValidationError::InvalidFormat {
            field: "tax_rate".to_string(),
            reason: "at most four decimal places".to_string(),
        });
    }

    Ok(())
}

/// Validates one participant's explicit share of an item.
///
/// ## Rules
/// - Must be a finite number
/// - Must be >= 0 (zero pins a participant to "none of it")
pub fn validate_split_quantity(participant: &str, qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: format!("quantity for {}", participant),
            reason: "must be a finite number".to_string(),
        });
    }

    if qty < 0.0 {
        return Err(ValidationError::Negative {
            field: format!("quantity for {}", participant),
        });
    }

    Ok(())
}

/// Validates a bill discount expressed as a fraction.
///
/// ## Rules
/// - `0 <= discount < 1` (a 100% discount is not a discount, it's a gift)
///
/// ## Example
/// ```rust
/// use billsplit_core::validation::validate_discount;
///
/// assert!(validate_discount(0.0).is_ok());
/// assert!(validate_discount(0.15).is_ok());
/// assert!(validate_discount(1.0).is_err());
/// assert!(validate_discount(-0.1).is_err());
/// ```
pub fn validate_discount(discount: f64) -> ValidationResult<()> {
    if !(0.0..1.0).contains(&discount) {
        return Err(ValidationError::InvalidDiscount { value: discount });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
