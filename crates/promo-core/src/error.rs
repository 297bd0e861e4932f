//! # Error Types
//!
//! Domain-specific error types for promo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  promo-core errors (this file)                                         │
//! │  ├── CoreError        - Collaborator and money failures                │
//! │  └── ValidationError  - Cart item validation failures                  │
//! │                                                                         │
//! │  promo-checkout errors (separate crate)                                │
//! │  └── CheckoutError    - Settings file and cart mutation failures       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → host pipeline     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decision engine itself has no failure modes. Everything in
//! [`CoreError`] either comes from a collaborator (configuration lookup,
//! rounding) or from turning a decimal back into [`Money`](crate::Money).

use thiserror::Error;

/// Boxed error raised by a host collaborator.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Core Error
// =============================================================================

/// Core discount engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration provider failed while looking up a key.
    ///
    /// The engine does not recover from this; the host decides whether
    /// to retry the cart calculation.
    #[error("Configuration lookup failed for {key}: {source}")]
    ConfigProvider {
        key: String,
        #[source]
        source: ProviderError,
    },

    /// The rounding policy could not round an amount.
    #[error("Rounding failed: {reason}")]
    Rounding { reason: String },

    /// A decimal amount does not fit into whole minor currency units.
    #[error("Amount {value} cannot be represented as money")]
    MoneyOutOfRange { value: String },

    /// The summed quantity of a group does not fit into an i64.
    #[error("Quantity of group {key:?} is out of range")]
    QuantityOutOfRange { key: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Wraps a collaborator failure for the given configuration key.
    pub fn config_provider(key: impl Into<String>, source: impl Into<ProviderError>) -> Self {
        CoreError::ConfigProvider {
            key: key.into(),
            source: source.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for cart items.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a line total that does not match the unit price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
        let err = CoreError::Rounding {
            reason: "interval must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "Rounding failed: interval must be positive");

        let err = CoreError::MoneyOutOfRange {
            value: "0.001".to_string(),
        };
        assert_eq!(err.to_string(), "Amount 0.001 cannot be represented as money");
    }

    #[test]
    fn test_config_provider_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "store offline");
        let err = CoreError::config_provider("SalesDiscount.config.nthStep", io);

        assert_eq!(
            err.to_string(),
            "Configuration lookup failed for SalesDiscount.config.nthStep: store offline"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "id is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
