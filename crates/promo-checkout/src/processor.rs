//! # Sales Discount Processor
//!
//! Runs on every cart recalculation and keeps exactly one sales discount
//! line item in sync with the cart contents.
//!
//! ## Processing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    process(cart, ctx)                                   │
//! │                                                                         │
//! │  1. Drop previous sales discount ──► re-evaluation never stacks        │
//! │  2. No product items? ─────────────► Ok(None)                          │
//! │  3. DiscountDecision::decide() ────► None? Ok(None)                    │
//! │  4. Percentage with rate ≤ 0? ─────► Ok(None)                          │
//! │  5. Build DiscountLineItem ────────► cart.discount = Some(..)          │
//! │  6. Return the choice                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use promo_core::{
    ConfigProvider, DiscountChoice, DiscountDecision, DiscountKind, DiscountRate, PricingContext,
    RoundingPolicy,
};
use tracing::{debug, info};

use crate::cart::Cart;
use crate::error::CheckoutResult;
use crate::price::DiscountLineItem;

/// Applies the better of the two sales discounts to a cart.
#[derive(Debug, Clone)]
pub struct SalesDiscountProcessor<C, R> {
    decision: DiscountDecision<C, R>,
}

impl<C, R> SalesDiscountProcessor<C, R>
where
    C: ConfigProvider,
    R: RoundingPolicy,
{
    /// Creates a processor backed by the given configuration and rounding.
    pub fn new(config: C, rounding: R) -> Self {
        SalesDiscountProcessor {
            decision: DiscountDecision::new(config, rounding),
        }
    }

    /// The underlying decision service.
    pub fn decision(&self) -> &DiscountDecision<C, R> {
        &self.decision
    }

    /// Recalculates the sales discount of `cart`.
    ///
    /// Returns the applied choice, or `None` when no discount applies. In
    /// both cases any earlier sales discount has been removed. Collaborator
    /// errors leave the cart without a discount.
    pub fn process(&self, cart: &mut Cart, ctx: &PricingContext) -> CheckoutResult<Option<DiscountChoice>> {
        if let Some(previous) = cart.discount.take() {
            debug!(cart_id = %cart.id, code = %previous.id, "Removed previous sales discount");
        }

        let product_ids = cart.product_ids();
        if product_ids.is_empty() {
            return Ok(None);
        }

        let Some(choice) = self.decision.decide(&cart.items, ctx)? else {
            return Ok(None);
        };

        let rate = match choice.kind() {
            DiscountKind::Absolute => DiscountRate::zero(),
            DiscountKind::Percentage => {
                let rate = self.decision.percent_value(&ctx.channel_id)?;
                if !rate.is_positive() {
                    debug!(cart_id = %cart.id, %rate, "Percentage rate not positive, skipping discount");
                    return Ok(None);
                }
                rate
            }
        };

        let line_item = DiscountLineItem::from_choice(&choice, rate, product_ids);

        info!(
            cart_id = %cart.id,
            channel_id = %ctx.channel_id,
            code = %line_item.id,
            amount = %choice.amount(),
            "Sales discount applied"
        );

        cart.discount = Some(line_item);
        Ok(Some(choice))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::price::PriceDefinition;
    use promo_core::config::{InMemoryConfig, NTH_GROUP_BY, PERCENT_VALUE};
    use promo_core::{CartItem, CashRounding, CoreError, CoreResult, ConfigValue, Money};
    use rust_decimal_macros::dec;

    fn processor(config: InMemoryConfig) -> SalesDiscountProcessor<InMemoryConfig, CashRounding> {
        SalesDiscountProcessor::new(config, CashRounding::new())
    }

    fn product(id: &str, reference: &str, qty: i64, cents: i64) -> CartItem {
        CartItem::product(id, reference, qty, Money::from_cents(cents))
    }

    #[test]
    fn test_applies_absolute_discount() {
        let processor = processor(InMemoryConfig::new().with(NTH_GROUP_BY, "refId"));
        let mut cart = Cart::new();
        cart.add_item(product("line-1", "A", 10, 200)).unwrap();

        let choice = processor
            .process(&mut cart, &PricingContext::new("web"))
            .unwrap()
            .unwrap();

        assert_eq!(choice.kind(), DiscountKind::Absolute);
        assert_eq!(choice.amount().cents(), 400);

        let discount = cart.discount.as_ref().unwrap();
        assert_eq!(discount.id, "ABSOLUTE_DISCOUNT");
        assert_eq!(discount.price.cents(), -400);
        assert_eq!(cart.total().cents(), 1600);
    }

    #[test]
    fn test_applies_percentage_discount() {
        let processor = processor(InMemoryConfig::new());
        let mut cart = Cart::new();
        cart.add_item(product("line-1", "B", 1, 15_000)).unwrap();

        let choice = processor
            .process(&mut cart, &PricingContext::new("web"))
            .unwrap()
            .unwrap();

        assert_eq!(choice.kind(), DiscountKind::Percentage);
        assert_eq!(choice.amount().cents(), 1500);

        let discount = cart.discount.as_ref().unwrap();
        match &discount.definition {
            PriceDefinition::Percentage { percentage, rule } => {
                assert_eq!(*percentage, dec!(-10));
                assert_eq!(rule.ids, vec!["line-1".to_string()]);
            }
            other => panic!("unexpected definition {:?}", other),
        }
        assert_eq!(cart.total().cents(), 13_500);
    }

    #[test]
    fn test_reprocessing_does_not_stack() {
        let processor = processor(InMemoryConfig::new().with(NTH_GROUP_BY, "refId"));
        let mut cart = Cart::new();
        cart.add_item(product("line-1", "A", 10, 200)).unwrap();
        let ctx = PricingContext::new("web");

        processor.process(&mut cart, &ctx).unwrap();
        processor.process(&mut cart, &ctx).unwrap();

        assert_eq!(cart.total().cents(), 1600);
    }

    #[test]
    fn test_removes_discount_when_no_longer_qualifying() {
        let processor = processor(InMemoryConfig::new().with(NTH_GROUP_BY, "refId"));
        let mut cart = Cart::new();
        cart.add_item(product("line-1", "A", 10, 200)).unwrap();
        let ctx = PricingContext::new("web");

        processor.process(&mut cart, &ctx).unwrap();
        assert!(cart.discount.is_some());

        cart.update_quantity("line-1", 4).unwrap();
        assert!(processor.process(&mut cart, &ctx).unwrap().is_none());
        assert!(cart.discount.is_none());
    }

    #[test]
    fn test_empty_cart_has_no_discount() {
        let processor = processor(InMemoryConfig::new());
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("promo-1", "promotion", 1, Money::from_cents(-500)))
            .unwrap();

        assert!(processor
            .process(&mut cart, &PricingContext::new("web"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_zero_rate_never_applies_percentage() {
        let processor = processor(InMemoryConfig::new().with(PERCENT_VALUE, 0));
        let mut cart = Cart::new();
        cart.add_item(product("line-1", "B", 1, 15_000)).unwrap();

        assert!(processor
            .process(&mut cart, &PricingContext::new("web"))
            .unwrap()
            .is_none());
    }

    struct OfflineConfig;

    impl ConfigProvider for OfflineConfig {
        fn get(&self, key: &str, _channel_id: &str) -> CoreResult<Option<ConfigValue>> {
            Err(CoreError::config_provider(key, "config store offline"))
        }
    }

    #[test]
    fn test_provider_failure_propagates() {
        let processor = SalesDiscountProcessor::new(OfflineConfig, CashRounding::new());
        let mut cart = Cart::new();
        cart.add_item(product("line-1", "A", 10, 200)).unwrap();
        cart.discount = Some(DiscountLineItem::absolute(Money::from_cents(100)));

        let err = processor
            .process(&mut cart, &PricingContext::new("web"))
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Core(CoreError::ConfigProvider { .. })));
        assert!(cart.discount.is_none());
    }
}
