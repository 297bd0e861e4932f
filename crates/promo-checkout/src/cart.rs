//! # Cart
//!
//! The checkout cart the discount processor works on.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Storefront Action        Cart Method             State Change          │
//! │  ─────────────────        ───────────             ────────────          │
//! │                                                                         │
//! │  Add line item ──────────► add_item() ──────────► push or merge by id  │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ───► qty = n, total again │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ───────► items.retain(..)     │
//! │                                                                         │
//! │  Recalculate ────────────► processor.process() ─► discount replaced    │
//! │                                                                         │
//! │  NOTE: the discount line item lives apart from `items`, so the         │
//! │        engine never sees its own output as input.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use promo_core::validation::{validate_cart_item, validate_cart_size, validate_quantity};
use promo_core::{sum_line_totals, CartItem, Money};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, CheckoutResult};
use crate::price::DiscountLineItem;

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by line item id (adding the same id increases quantity)
/// - Quantity must be > 0 (setting qty to 0 removes the item)
/// - At most one sales discount is applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart token.
    pub id: Uuid,

    /// Line items in the cart, in insertion order.
    pub items: Vec<CartItem>,

    /// Sales discount applied by the last recalculation.
    pub discount: Option<DiscountLineItem>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            id: Uuid::new_v4(),
            items: Vec::new(),
            discount: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a line item or merges it into the item with the same id.
    ///
    /// Merging adds quantity and line total; the existing unit price stays.
    pub fn add_item(&mut self, item: CartItem) -> CheckoutResult<()> {
        validate_cart_item(&item)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            let new_qty = existing.quantity + item.quantity;
            validate_quantity(new_qty)?;

            existing.quantity = new_qty;
            existing.total_price += item.total_price;
            return Ok(());
        }

        validate_cart_size(self.items.len())?;
        self.items.push(item);
        Ok(())
    }

    /// Updates the quantity of a line item and recomputes its total.
    ///
    /// A quantity of 0 removes the item.
    pub fn update_quantity(&mut self, line_item_id: &str, quantity: i64) -> CheckoutResult<()> {
        if quantity == 0 {
            return self.remove_item(line_item_id);
        }

        validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == line_item_id)
            .ok_or_else(|| CheckoutError::ItemNotFound(line_item_id.to_string()))?;

        item.quantity = quantity;
        item.total_price = item.unit_price.multiply_quantity(quantity);
        Ok(())
    }

    /// Removes a line item by id.
    pub fn remove_item(&mut self, line_item_id: &str) -> CheckoutResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != line_item_id);

        if self.items.len() == initial_len {
            Err(CheckoutError::ItemNotFound(line_item_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all items and the discount.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = None;
        self.created_at = Utc::now();
    }

    /// Product line items, the only ones the discount engine considers.
    pub fn product_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|i| i.is_product())
    }

    /// Ids of all product line items.
    pub fn product_ids(&self) -> Vec<String> {
        self.product_items().map(|i| i.id.clone()).collect()
    }

    /// Sum of the line totals of the given line items.
    pub fn price_sum(&self, line_item_ids: &[String]) -> Money {
        sum_line_totals(self.items.iter().filter(|i| line_item_ids.contains(&i.id)))
    }

    /// Sum of all line totals, before the sales discount.
    pub fn subtotal(&self) -> Money {
        sum_line_totals(&self.items)
    }

    /// Subtotal plus the (negative) sales discount price.
    pub fn total(&self) -> Money {
        let discount = self.discount.as_ref().map(|d| d.price).unwrap_or_default();
        self.subtotal() + discount
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
