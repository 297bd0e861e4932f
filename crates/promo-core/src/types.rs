//! # Domain Types
//!
//! Core domain types used by the discount decision engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartItem     │   │ AggregatedGroup │   │ DiscountChoice  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  key            │   │  kind           │       │
//! │  │  kind           │──►│  quantity       │──►│  amount (≥ 0)   │       │
//! │  │  reference_id   │   │  unit_price     │   └─────────────────┘       │
//! │  │  label          │   └─────────────────┘                              │
//! │  │  quantity       │                                                    │
//! │  │  unit_price     │   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  total_price    │   │    GroupBy      │   │  DiscountKind   │       │
//! │  └─────────────────┘   │  ReferenceId    │   │  Absolute       │       │
//! │                        │  Type           │   │  Percentage     │       │
//! │                        │  Label (def.)   │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart items belong to the host cart; the engine only reads them.
//! Groups and choices are created per decision and thrown away afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;

/// Line item type of products. Only these take part in discount decisions.
pub const PRODUCT_LINE_ITEM_TYPE: &str = "product";

/// Line item type of the discount line item inserted by the checkout processor.
pub const DISCOUNT_LINE_ITEM_TYPE: &str = "sales_discount";

/// Line item id of an applied "every Nth free" discount.
pub const ABSOLUTE_DISCOUNT_CODE: &str = "ABSOLUTE_DISCOUNT";

/// Line item id of an applied percentage-over-threshold discount.
pub const PERCENTAGE_DISCOUNT_CODE: &str = "PERCENTAGE_DISCOUNT";

// =============================================================================
// Cart Item
// =============================================================================

/// A line item as seen by the discount engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line item id, unique within the cart.
    pub id: String,

    /// Line item type: `product`, `promotion`, `sales_discount`, ...
    pub kind: String,

    /// Id of the referenced entity (product id for products).
    pub reference_id: Option<String>,

    /// Display label.
    pub label: Option<String>,

    /// Quantity in cart.
    pub quantity: i64,

    /// Price of one unit.
    pub unit_price: Money,

    /// Line total as calculated by the host.
    pub total_price: Money,
}

impl CartItem {
    /// Creates a product line item; the total is `unit_price × quantity`.
    pub fn product(
        id: impl Into<String>,
        reference_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        CartItem {
            id: id.into(),
            kind: PRODUCT_LINE_ITEM_TYPE.to_string(),
            reference_id: Some(reference_id.into()),
            label: None,
            quantity,
            unit_price,
            total_price: unit_price.multiply_quantity(quantity),
        }
    }

    /// Creates a line item of an arbitrary type.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        CartItem {
            id: id.into(),
            kind: kind.into(),
            reference_id: None,
            label: None,
            quantity,
            unit_price,
            total_price: unit_price.multiply_quantity(quantity),
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true for product line items.
    #[inline]
    pub fn is_product(&self) -> bool {
        self.kind == PRODUCT_LINE_ITEM_TYPE
    }
}

/// Sums the line totals of the given items.
pub fn sum_line_totals<'a, I>(items: I) -> Money
where
    I: IntoIterator<Item = &'a CartItem>,
{
    items.into_iter().map(|item| item.total_price).sum()
}

/// Sums the line totals of the given items, failing on overflow.
pub fn try_sum_line_totals<'a, I>(items: I) -> CoreResult<Money>
where
    I: IntoIterator<Item = &'a CartItem>,
{
    Money::try_sum(items.into_iter().map(|item| item.total_price))
}

// =============================================================================
// Grouping
// =============================================================================

/// How cart items are grouped for the "every Nth free" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    /// Group by the referenced product id.
    #[serde(alias = "refId")]
    ReferenceId,
    /// Group by line item type.
    Type,
    /// Group by display label.
    #[default]
    #[serde(alias = "name")]
    Label,
}

impl GroupBy {
    /// Derives the grouping key of an item. Missing values group under `""`.
    pub fn key_for<'a>(&self, item: &'a CartItem) -> &'a str {
        match self {
            GroupBy::ReferenceId => item.reference_id.as_deref().unwrap_or(""),
            GroupBy::Type => &item.kind,
            GroupBy::Label => item.label.as_deref().unwrap_or(""),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::ReferenceId => write!(f, "refId"),
            GroupBy::Type => write!(f, "type"),
            GroupBy::Label => write!(f, "label"),
        }
    }
}

/// Unknown values fall back to [`GroupBy::Label`], so parsing never fails.
impl FromStr for GroupBy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "refId" | "referenceId" | "reference_id" => GroupBy::ReferenceId,
            "type" => GroupBy::Type,
            _ => GroupBy::Label,
        })
    }
}

/// Cart items sharing one grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedGroup {
    /// Grouping key.
    pub key: String,

    /// Summed quantity of all items in the group.
    pub quantity: i64,

    /// Unit price of the last item seen for this key.
    pub unit_price: Money,
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage rate of the threshold discount, e.g. `10.0` for 10 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscountRate(Decimal);

impl DiscountRate {
    /// Creates a rate from a percentage.
    #[inline]
    pub const fn from_percentage(pct: Decimal) -> Self {
        DiscountRate(pct)
    }

    /// Creates a rate from basis points (1000 = 10 %).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        DiscountRate(Decimal::new(i64::from(bps), 2))
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percentage(&self) -> Decimal {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(Decimal::ZERO)
    }

    /// Checks if the rate is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Discount Choice
// =============================================================================

/// Which discount won the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// "Every Nth unit free", applied as a fixed amount.
    Absolute,
    /// Percentage off once the subtotal exceeds the threshold.
    Percentage,
}

impl DiscountKind {
    /// Stable line item id for this kind of discount.
    pub const fn code(&self) -> &'static str {
        match self {
            DiscountKind::Absolute => ABSOLUTE_DISCOUNT_CODE,
            DiscountKind::Percentage => PERCENTAGE_DISCOUNT_CODE,
        }
    }

    /// Translation key of the discount line item label.
    pub const fn label(&self) -> &'static str {
        match self {
            DiscountKind::Absolute => "sales.discount.absolute",
            DiscountKind::Percentage => "sales.discount.percentage",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountKind::Absolute => write!(f, "absolute"),
            DiscountKind::Percentage => write!(f, "percentage"),
        }
    }
}

/// The outcome of a discount decision.
///
/// The amount is never negative; negative input is clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountChoice {
    kind: DiscountKind,
    amount: Money,
}

impl DiscountChoice {
    /// Creates a choice.
    pub fn new(kind: DiscountKind, amount: Money) -> Self {
        DiscountChoice {
            kind,
            amount: amount.max(Money::zero()),
        }
    }

    /// Which discount was chosen.
    #[inline]
    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    /// Customer benefit of the chosen discount.
    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
