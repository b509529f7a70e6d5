//! # Category Registry
//!
//! Named tax rates. Append-only: once an item refers to a category by name,
//! that name keeps meaning the same rate for the life of the bill.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Category, TaxRate};
use crate::validation::{validate_name, validate_tax_percentage};
use crate::DEFAULT_CATEGORY;

/// Categories in insertion order. The first one is always the non-taxable
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        CategoryRegistry {
            categories: vec![Category {
                name: DEFAULT_CATEGORY.to_string(),
                tax_rate: TaxRate::zero(),
            }],
        }
    }
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category with a tax rate given as a percentage.
    ///
    /// ## Errors
    /// `Validation` if the name is empty or taken, or the rate is negative.
    pub fn add(&mut self, name: &str, tax_rate_percent: f64) -> CoreResult<&Category> {
        let name = validate_name("category", name)?;
        validate_tax_percentage(tax_rate_percent)?;

        if self.get(&name).is_some() {
            return Err(ValidationError::Duplicate {
                field: "category".to_string(),
                value: name,
            }
            .into());
        }

        self.categories.push(Category {
            name,
            tax_rate: TaxRate::from_percentage(tax_rate_percent),
        });
        Ok(&self.categories[self.categories.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        let name = name.trim();
        self.categories.iter().find(|c| c.name == name)
    }

    /// Resolves a category name, `None` meaning the default.
    pub fn resolve(&self, name: Option<&str>) -> CoreResult<&Category> {
        match name {
            None => Ok(self.default_category()),
            Some(name) => self
                .get(name)
                .ok_or_else(|| CoreError::not_found("Category", name.trim())),
        }
    }

    /// Tax rate of a category; unknown names are treated as non-taxable.
    pub fn tax_rate_of(&self, name: &str) -> TaxRate {
        self.get(name).map(|c| c.tax_rate).unwrap_or_default()
    }

    pub fn default_category(&self) -> &Category {
        &self.categories[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Never true: the default category always exists.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category_exists() {
        let registry = CategoryRegistry::new();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.default_category().name, DEFAULT_CATEGORY);
        assert!(!registry.default_category().is_taxable());
        assert_eq!(registry.resolve(None).unwrap().name, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_add_category() {
        let mut registry = CategoryRegistry::new();
        let alcohol = registry.add("Alcohol", 8.0).unwrap();
        assert_eq!(alcohol.tax_rate.millionths(), 80_000);
        assert!(alcohol.is_taxable());

        assert_eq!(registry.tax_rate_of("Alcohol").percentage(), 8.0);
        assert_eq!(registry.tax_rate_of("Unknown").millionths(), 0);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut registry = CategoryRegistry::new();
        let err = registry.add("Weird", -1.0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Negative { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_validation_error() {
        let mut registry = CategoryRegistry::new();
        registry.add("Alcohol", 8.0).unwrap();

        let err = registry.add("Alcohol", 10.0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
        assert!(registry.add(DEFAULT_CATEGORY, 0.0).is_err());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = CategoryRegistry::new();
        assert!(matches!(
            registry.resolve(Some("Household")),
            Err(CoreError::NotFound { .. })
        ));
    }
}
