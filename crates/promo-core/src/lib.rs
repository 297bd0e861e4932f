//! # promo-core: Discount Decision Engine
//!
//! Pure logic that computes the single best promotional discount for a
//! cart: "every Nth unit free" versus "percentage off above a threshold".
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Promo Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Host Checkout Pipeline                         │   │
//! │  │   cart recalculation ──► processors ──► totals ──► order        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          promo-checkout (SalesDiscountProcessor)                │   │
//! │  │     settings file, cart snapshot, discount line items           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ promo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ grouping │ │ decision │ │ rounding │ │ config           │  │   │
//! │  │   │ GroupBy  │ │ absolute │ │ Policy   │ │ Provider         │  │   │
//! │  │   │ groups   │ │ percent  │ │ Cash     │ │ DecisionConfig   │  │   │
//! │  │   └──────────┘ │ choose   │ └──────────┘ └──────────────────┘  │   │
//! │  │                └──────────┘                                     │   │
//! │  │   NO I/O • NO CART MUTATION • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - CartItem, GroupBy, DiscountChoice, ...
//! - [`money`] - Money type with integer arithmetic
//! - [`grouping`] - Group aggregation for the "every Nth free" rule
//! - [`decision`] - Candidate calculators, selector and the decision service
//! - [`rounding`] - Rounding policy contract and cash rounding
//! - [`config`] - Configuration provider contract and coercion
//! - [`error`] - Domain error types
//! - [`validation`] - Cart item validation
//!
//! ## Example Usage
//!
//! ```rust
//! use promo_core::config::{InMemoryConfig, NTH_GROUP_BY};
//! use promo_core::decision::{DiscountDecision, PricingContext};
//! use promo_core::rounding::CashRounding;
//! use promo_core::{CartItem, DiscountKind, Money};
//!
//! let config = InMemoryConfig::new().with(NTH_GROUP_BY, "refId");
//! let decision = DiscountDecision::new(config, CashRounding::new());
//!
//! let items = vec![
//!     CartItem::product("1", "A", 5, Money::from_cents(200)),
//!     CartItem::product("2", "B", 4, Money::from_cents(1000)),
//!     CartItem::product("3", "A", 5, Money::from_cents(200)),
//! ];
//!
//! let choice = decision
//!     .decide(&items, &PricingContext::new("storefront"))
//!     .unwrap()
//!     .unwrap();
//!
//! // Subtotal $60.00 stays below the $100.00 threshold; two free A units win.
//! assert_eq!(choice.kind(), DiscountKind::Absolute);
//! assert_eq!(choice.amount().cents(), 400);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod decision;
pub mod error;
pub mod grouping;
pub mod money;
pub mod rounding;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{ConfigProvider, ConfigValue, DecisionConfig, InMemoryConfig};
pub use decision::{choose, compute_absolute, compute_percentage, DiscountDecision, PricingContext};
pub use error::{CoreError, CoreResult, ValidationError};
pub use grouping::aggregate;
pub use money::Money;
pub use rounding::{CashRounding, RoundingConfig, RoundingMode, RoundingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
pub const MAX_ITEM_QUANTITY: i64 = 999;
