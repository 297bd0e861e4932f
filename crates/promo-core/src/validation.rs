//! # Validation Module
//!
//! Checks cart items before they enter a cart.
//!
//! The decision engine itself never rejects input: it clamps and defaults.
//! These checks belong to the cart side, so a malformed line item is
//! refused when it is added instead of quietly skewing a discount later.
//!
//! ## Usage
//! ```rust
//! use promo_core::validation::{validate_cart_item, validate_quantity};
//! use promo_core::{CartItem, Money};
//!
//! validate_quantity(5).unwrap();
//!
//! let item = CartItem::product("line-1", "A", 2, Money::from_cents(199));
//! validate_cart_item(&item).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::CartItem;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a line item id or type: must not be blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity value.
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

/// Validates a product unit price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates cart size (number of line items) before adding one more.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Item Validator
// =============================================================================

/// Validates a whole line item.
///
/// Non-product items (promotions, fees) may carry negative prices; products
/// may not.
pub fn validate_cart_item(item: &CartItem) -> ValidationResult<()> {
    validate_required("id", &item.id)?;
    validate_required("type", &item.kind)?;
    validate_quantity(item.quantity)?;

    if item.is_product() {
        validate_price_cents(item.unit_price.cents())?;

        if item.total_price.is_negative() {
            return Err(ValidationError::InvalidFormat {
                field: "total price".to_string(),
                reason: "product line totals cannot be negative".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }

    #[test]
    fn test_validate_cart_item() {
        let product = CartItem::product("line-1", "A", 2, Money::from_cents(199));
        assert!(validate_cart_item(&product).is_ok());

        let blank_id = CartItem::product("  ", "A", 2, Money::from_cents(199));
        assert!(matches!(
            validate_cart_item(&blank_id),
            Err(ValidationError::Required { .. })
        ));

        let negative = CartItem::product("line-2", "A", 1, Money::from_cents(-1));
        assert!(validate_cart_item(&negative).is_err());

        let zero_qty = CartItem::product("line-3", "A", 0, Money::from_cents(100));
        assert!(validate_cart_item(&zero_qty).is_err());
    }

    #[test]
    fn test_non_products_may_be_negative() {
        let promotion = CartItem::new("promo-1", "promotion", 1, Money::from_cents(-500));
        assert!(validate_cart_item(&promotion).is_ok());
    }
}
