//! # Discount Decision
//!
//! Computes the two candidate discounts and picks the one that is worth
//! more to the customer.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Decision per Cart Evaluation                   │
//! │                                                                         │
//! │  cart items ──► product items ──► none? ──────────────► no discount    │
//! │                      │                                                  │
//! │         ┌────────────┴─────────────┐                                    │
//! │         ▼                          ▼                                    │
//! │  aggregate(group_by)         subtotal = Σ line totals                   │
//! │         │                          │                                    │
//! │         ▼                          ▼                                    │
//! │  compute_absolute            compute_percentage                         │
//! │  (item rounding)             (total rounding)                           │
//! │         │                          │                                    │
//! │         └────────────┬─────────────┘                                    │
//! │                      ▼                                                  │
//! │         both ≤ 0? ──────────────────────────────────► no discount      │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │         choose: absolute ≥ percentage → ABSOLUTE (ties included)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculators and the selector are free functions with no side
//! effects. [`DiscountDecision`] wires them to the host's configuration
//! and rounding collaborators. Nothing is cached between evaluations.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{ConfigProvider, DecisionConfig};
use crate::error::{CoreError, CoreResult};
use crate::grouping::{aggregate, GroupMap};
use crate::money::Money;
use crate::rounding::{RoundingConfig, RoundingPolicy};
use crate::types::{try_sum_line_totals, CartItem, DiscountChoice, DiscountKind, DiscountRate};

// =============================================================================
// Calculators
// =============================================================================

/// "Every Nth unit free": for each group, `quantity / step` units at the
/// group's unit price, summed and then rounded once.
///
/// A `step` below 1 is treated as 1.
///
/// ## Example
/// ```rust
/// use promo_core::decision::compute_absolute;
/// use promo_core::grouping::aggregate;
/// use promo_core::rounding::{CashRounding, RoundingConfig};
/// use promo_core::{CartItem, GroupBy, Money};
///
/// let items = vec![CartItem::product("1", "A", 10, Money::from_cents(200))];
/// let groups = aggregate(&items, GroupBy::ReferenceId).unwrap();
///
/// let amount = compute_absolute(&groups, 5, &CashRounding, &RoundingConfig::default()).unwrap();
/// assert_eq!(amount.cents(), 400); // 2 free units × $2.00
/// ```
pub fn compute_absolute<R>(
    groups: &GroupMap,
    step: i64,
    rounding: &R,
    rounding_config: &RoundingConfig,
) -> CoreResult<Money>
where
    R: RoundingPolicy + ?Sized,
{
    let step = step.max(1);

    let free_amounts = groups
        .values()
        .filter_map(|group| {
            let free_units = group.quantity / step;
            (free_units > 0).then_some((group, free_units))
        })
        .map(|(group, free_units)| {
            group
                .unit_price
                .checked_mul(free_units)
                .ok_or_else(|| CoreError::MoneyOutOfRange {
                    value: format!("{} × {}", group.unit_price, free_units),
                })
        })
        .collect::<CoreResult<Vec<Money>>>()?;

    let total = Money::try_sum(free_amounts)?;

    let amount = rounding.round(total.to_decimal(), rounding_config)?;
    Ok(amount.max(Money::zero()))
}

/// Percentage off the subtotal once it strictly exceeds `threshold`.
///
/// A subtotal equal to the threshold does not qualify. The threshold is
/// compared unrounded, so `99.995` is exceeded by a subtotal of `100.00`.
/// Amounts too large for decimal arithmetic fail with
/// [`CoreError::MoneyOutOfRange`].
///
/// ## Example
/// ```rust
/// use promo_core::decision::compute_percentage;
/// use promo_core::rounding::{CashRounding, RoundingConfig};
/// use promo_core::{DiscountRate, Money};
/// use rust_decimal::Decimal;
///
/// let threshold = Decimal::new(10_000, 2);
/// let rate = DiscountRate::from_bps(1_000);
/// let config = RoundingConfig::default();
///
/// let at = compute_percentage(Money::from_cents(10_000), threshold, rate, &CashRounding, &config).unwrap();
/// assert!(at.is_zero());
///
/// let above = compute_percentage(Money::from_cents(20_000), threshold, rate, &CashRounding, &config).unwrap();
/// assert_eq!(above.cents(), 2_000);
/// ```
pub fn compute_percentage<R>(
    subtotal: Money,
    threshold: Decimal,
    rate: DiscountRate,
    rounding: &R,
    rounding_config: &RoundingConfig,
) -> CoreResult<Money>
where
    R: RoundingPolicy + ?Sized,
{
    let subtotal = subtotal.to_decimal();
    if subtotal <= threshold {
        return Ok(Money::zero());
    }

    let raw = subtotal
        .checked_mul(rate.percentage())
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| CoreError::MoneyOutOfRange {
            value: format!("{} × {}%", subtotal, rate.percentage()),
        })?;
    let amount = rounding.round(raw, rounding_config)?;
    Ok(amount.max(Money::zero()))
}

/// Picks the larger candidate. Equal amounts go to [`DiscountKind::Absolute`].
///
/// Callers only invoke this when at least one amount is positive; a
/// zero-amount discount must never reach the cart.
pub fn choose(absolute: Money, percentage: Money) -> DiscountChoice {
    if absolute >= percentage {
        DiscountChoice::new(DiscountKind::Absolute, absolute)
    } else {
        DiscountChoice::new(DiscountKind::Percentage, percentage)
    }
}

// =============================================================================
// Pricing Context
// =============================================================================

/// Per-evaluation context supplied by the host checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingContext {
    /// Sales channel (tenant) the cart belongs to.
    pub channel_id: String,

    /// Rounding of line item amounts; used for the absolute candidate.
    pub item_rounding: RoundingConfig,

    /// Rounding of cart totals; used for the percentage candidate.
    pub total_rounding: RoundingConfig,
}

impl PricingContext {
    /// Context with default two-decimal rounding for both amounts.
    pub fn new(channel_id: impl Into<String>) -> Self {
        PricingContext {
            channel_id: channel_id.into(),
            item_rounding: RoundingConfig::default(),
            total_rounding: RoundingConfig::default(),
        }
    }

    /// Uses the same rounding for items and totals.
    pub fn with_rounding(mut self, rounding: RoundingConfig) -> Self {
        self.item_rounding = rounding;
        self.total_rounding = rounding;
        self
    }
}

// =============================================================================
// Decision Service
// =============================================================================

/// Both candidate amounts of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidates {
    pub absolute: Money,
    pub percentage: Money,
}

impl Candidates {
    /// True when neither candidate is worth anything.
    pub fn is_empty(&self) -> bool {
        !self.absolute.is_positive() && !self.percentage.is_positive()
    }
}

/// Runs the decision against the host's configuration and rounding.
///
/// Stateless: every call reads the configuration again, so changes take
/// effect on the next cart evaluation. Safe to share across threads when
/// the collaborators are.
#[derive(Debug, Clone)]
pub struct DiscountDecision<C, R> {
    config: C,
    rounding: R,
}

impl<C, R> DiscountDecision<C, R>
where
    C: ConfigProvider,
    R: RoundingPolicy,
{
    /// Creates the service.
    pub fn new(config: C, rounding: R) -> Self {
        DiscountDecision { config, rounding }
    }

    /// Resolves the configuration for a channel.
    pub fn config(&self, channel_id: &str) -> CoreResult<DecisionConfig> {
        DecisionConfig::resolve(&self.config, channel_id)
    }

    /// Returns the configured percentage rate for a channel.
    pub fn percent_value(&self, channel_id: &str) -> CoreResult<DiscountRate> {
        Ok(self.config(channel_id)?.rate)
    }

    /// "Every Nth free" candidate for the product items among `items`.
    pub fn calculate_every_nth_free(
        &self,
        items: &[CartItem],
        rounding_config: &RoundingConfig,
        channel_id: &str,
    ) -> CoreResult<Money> {
        let config = self.config(channel_id)?;
        self.absolute_candidate(items, &config, rounding_config)
    }

    /// Percentage candidate for a subtotal computed by the caller.
    pub fn calculate_percentage_over_threshold(
        &self,
        subtotal: Money,
        rounding_config: &RoundingConfig,
        channel_id: &str,
    ) -> CoreResult<Money> {
        let config = self.config(channel_id)?;
        self.percentage_candidate(subtotal, &config, rounding_config)
    }

    /// Picks the better candidate.
    pub fn choose_best(&self, absolute: Money, percentage: Money) -> DiscountChoice {
        choose(absolute, percentage)
    }

    /// Computes both candidates for a cart with one configuration snapshot.
    pub fn candidates(&self, items: &[CartItem], ctx: &PricingContext) -> CoreResult<Candidates> {
        let config = self.config(&ctx.channel_id)?;
        self.candidates_with(items, &config, ctx)
    }

    /// Full decision for a cart.
    ///
    /// Returns `Ok(None)` when the cart has no product items or when both
    /// candidates are zero.
    pub fn decide(&self, items: &[CartItem], ctx: &PricingContext) -> CoreResult<Option<DiscountChoice>> {
        if !items.iter().any(CartItem::is_product) {
            debug!(channel_id = %ctx.channel_id, "No product items, skipping discount");
            return Ok(None);
        }

        let candidates = self.candidates(items, ctx)?;

        if candidates.is_empty() {
            debug!(channel_id = %ctx.channel_id, "No discount qualifies");
            return Ok(None);
        }

        let choice = choose(candidates.absolute, candidates.percentage);
        debug!(
            channel_id = %ctx.channel_id,
            kind = %choice.kind(),
            amount = %choice.amount(),
            "Discount chosen"
        );

        Ok(Some(choice))
    }

    fn candidates_with(
        &self,
        items: &[CartItem],
        config: &DecisionConfig,
        ctx: &PricingContext,
    ) -> CoreResult<Candidates> {
        let absolute = self.absolute_candidate(items, config, &ctx.item_rounding)?;

        let subtotal = try_sum_line_totals(items.iter().filter(|item| item.is_product()))?;
        let percentage = self.percentage_candidate(subtotal, config, &ctx.total_rounding)?;

        debug!(
            channel_id = %ctx.channel_id,
            absolute = %absolute,
            percentage = %percentage,
            subtotal = %subtotal,
            "Computed discount candidates"
        );

        Ok(Candidates {
            absolute,
            percentage,
        })
    }

    fn absolute_candidate(
        &self,
        items: &[CartItem],
        config: &DecisionConfig,
        rounding_config: &RoundingConfig,
    ) -> CoreResult<Money> {
        let groups = aggregate(items, config.group_by)?;
        compute_absolute(&groups, config.step, &self.rounding, rounding_config)
    }

    fn percentage_candidate(
        &self,
        subtotal: Money,
        config: &DecisionConfig,
        rounding_config: &RoundingConfig,
    ) -> CoreResult<Money> {
        compute_percentage(
            subtotal,
            config.threshold,
            config.rate,
            &self.rounding,
            rounding_config,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
