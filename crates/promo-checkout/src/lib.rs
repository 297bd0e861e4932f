//! # promo-checkout: Checkout Integration
//!
//! Connects the pure decision engine in `promo-core` to a checkout cart.
//!
//! ## Recalculation Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Recalculation                                │
//! │                                                                         │
//! │  1. Initialize Logging (once) ────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,promo=debug, can be overridden with RUST_LOG        │
//! │                                                                         │
//! │  2. Load Settings ────────────────────────────────────────────────────► │
//! │     • promo.toml from the platform config dir                           │
//! │     • PROMO_* environment overrides                                     │
//! │                                                                         │
//! │  3. Process Cart ─────────────────────────────────────────────────────► │
//! │     • Remove previous sales discount                                    │
//! │     • Decide between "every Nth free" and "percent over threshold"      │
//! │     • Insert one discount line item                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use promo_checkout::{Cart, DiscountSettings, SalesDiscountProcessor};
//! use promo_core::{CartItem, CashRounding, Money, PricingContext};
//!
//! let processor = SalesDiscountProcessor::new(DiscountSettings::new(), CashRounding::new());
//!
//! let mut cart = Cart::new();
//! cart.add_item(CartItem::product("line-1", "B", 1, Money::from_cents(15_000)))
//!     .unwrap();
//!
//! let choice = processor
//!     .process(&mut cart, &PricingContext::new("storefront"))
//!     .unwrap();
//!
//! assert!(choice.is_some());
//! assert_eq!(cart.total().cents(), 13_500);
//! ```

pub mod cart;
pub mod error;
pub mod logging;
pub mod price;
pub mod processor;
pub mod settings;

pub use cart::Cart;
pub use error::{CheckoutError, CheckoutResult};
pub use logging::{init_tracing, DEFAULT_FILTER};
pub use price::{DiscountLineItem, LineItemRule, PriceDefinition, RuleOperator};
pub use processor::SalesDiscountProcessor;
pub use settings::{ChannelSettings, DiscountSettings};
