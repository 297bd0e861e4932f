//! # Checkout Error Types
//!
//! Error types for cart mutation, discount processing and settings files.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Engine         │  │  Settings       │  │     Cart                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core           │  │  Io             │  │  ItemNotFound           │ │
//! │  │  (config,       │  │  TomlParse      │  │  Core(Validation)       │ │
//! │  │   rounding)     │  │  TomlSerialize  │  │                         │ │
//! │  │                 │  │  InvalidConfig  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use promo_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout error type.
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Engine Errors
    // =========================================================================
    /// Error raised by the decision engine or one of its collaborators.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Settings Errors
    // =========================================================================
    /// Reading or writing the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML.
    #[error("Failed to parse settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The settings could not be written as TOML.
    #[error("Failed to serialize settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The settings parse but hold unusable values.
    #[error("Invalid discount settings: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Cart Errors
    // =========================================================================
    /// No line item with this id is in the cart.
    #[error("Line item {0} not in cart")]
    ItemNotFound(String),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_wraps_into_core() {
        let err: CheckoutError = ValidationError::Required {
            field: "id".to_string(),
        }
        .into();

        assert!(matches!(err, CheckoutError::Core(CoreError::Validation(_))));
        assert!(err.to_string().contains("id is required"));
    }

    #[test]
    fn test_item_not_found_message() {
        let err = CheckoutError::ItemNotFound("line-9".to_string());
        assert_eq!(err.to_string(), "Line item line-9 not in cart");
    }
}
