//! # Discount Line Items
//!
//! The line item a checkout shows for an applied sales discount, and the
//! price definition that tells the host's price calculator how to price it.
//!
//! ```text
//! DiscountChoice { Absolute, 4.00 }
//!     └─► DiscountLineItem { id: ABSOLUTE_DISCOUNT, price: -4.00,
//!                            definition: Absolute { price: -4.00 } }
//!
//! DiscountChoice { Percentage, 12.00 } (rate 10 %)
//!     └─► DiscountLineItem { id: PERCENTAGE_DISCOUNT, price: -12.00,
//!                            definition: Percentage { percentage: -10,
//!                                        rule: Eq [product ids] } }
//! ```

use promo_core::{DiscountChoice, DiscountKind, DiscountRate, Money, DISCOUNT_LINE_ITEM_TYPE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Line Item Rule
// =============================================================================

/// Comparison used by a [`LineItemRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    /// Line item id is one of the listed ids.
    Eq,
}

/// Restricts a percentage price definition to a set of line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRule {
    pub operator: RuleOperator,
    pub ids: Vec<String>,
}

impl LineItemRule {
    /// Rule matching exactly the given line item ids.
    pub fn matching(ids: Vec<String>) -> Self {
        LineItemRule {
            operator: RuleOperator::Eq,
            ids,
        }
    }
}

// =============================================================================
// Price Definition
// =============================================================================

/// How the host prices a discount line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PriceDefinition {
    /// Fixed amount; negative for discounts.
    Absolute { price: Money },

    /// Percentage of the line items matched by `rule`; negative for discounts.
    Percentage {
        #[serde(with = "rust_decimal::serde::str")]
        percentage: Decimal,
        rule: LineItemRule,
    },
}

// =============================================================================
// Discount Line Item
// =============================================================================

/// A sales discount as it sits in the cart.
///
/// ## Invariants
/// - `quantity` is always 1
/// - `good`, `stackable` and `removable` are always false
/// - `price` is the negated chosen amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountLineItem {
    /// Stable code: `ABSOLUTE_DISCOUNT` or `PERCENTAGE_DISCOUNT`.
    pub id: String,

    /// Always `sales_discount`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Translation key of the label.
    pub label: String,

    pub quantity: i64,
    pub good: bool,
    pub stackable: bool,
    pub removable: bool,

    pub definition: PriceDefinition,

    /// Resolved price of the line item.
    pub price: Money,

    /// Which discount this line item carries.
    pub discount_kind: DiscountKind,
}

impl DiscountLineItem {
    /// Builds the "every Nth free" discount line item.
    pub fn absolute(amount: Money) -> Self {
        let price = -amount.abs();
        Self::build(
            DiscountKind::Absolute,
            PriceDefinition::Absolute { price },
            price,
        )
    }

    /// Builds the percentage discount line item restricted to `product_ids`.
    pub fn percentage(rate: DiscountRate, amount: Money, product_ids: Vec<String>) -> Self {
        Self::build(
            DiscountKind::Percentage,
            PriceDefinition::Percentage {
                percentage: -rate.percentage().abs(),
                rule: LineItemRule::matching(product_ids),
            },
            -amount.abs(),
        )
    }

    /// Builds the line item for a chosen discount.
    ///
    /// `product_ids` is only used for percentage discounts.
    pub fn from_choice(choice: &DiscountChoice, rate: DiscountRate, product_ids: Vec<String>) -> Self {
        match choice.kind() {
            DiscountKind::Absolute => Self::absolute(choice.amount()),
            DiscountKind::Percentage => Self::percentage(rate, choice.amount(), product_ids),
        }
    }

    fn build(kind: DiscountKind, definition: PriceDefinition, price: Money) -> Self {
        DiscountLineItem {
            id: kind.code().to_string(),
            kind: DISCOUNT_LINE_ITEM_TYPE.to_string(),
            label: kind.label().to_string(),
            quantity: 1,
            good: false,
            stackable: false,
            removable: false,
            definition,
            price,
            discount_kind: kind,
        }
    }
}
