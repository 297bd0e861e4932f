//! # Group Aggregator
//!
//! Partitions product line items into groups for the "every Nth free" rule.
//!
//! ```text
//! items (in cart order)           groups (GroupBy::ReferenceId)
//! ─────────────────────           ─────────────────────────────
//! A  qty 5  @ $2.00   ──┐
//! B  qty 4  @ $10.00  ──┼──────►  A: qty 10, unit $2.00
//! A  qty 5  @ $2.00   ──┘         B: qty  4, unit $10.00
//! ```
//!
//! Quantities are summed. The unit price of a group is the price of the
//! LAST item seen for its key, not an average or a maximum. Carts that
//! reprice the same product mid-cart therefore get the later price.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{CoreError, CoreResult};
use crate::types::{AggregatedGroup, CartItem, GroupBy};

/// Groups keyed by grouping key.
pub type GroupMap = BTreeMap<String, AggregatedGroup>;

/// Aggregates product items by the given grouping mode.
///
/// Items that are not products are skipped. Pure function of its inputs.
/// Fails with [`CoreError::QuantityOutOfRange`] when a group's summed
/// quantity overflows.
///
/// ## Example
/// ```rust
/// use promo_core::grouping::aggregate;
/// use promo_core::{CartItem, GroupBy, Money};
///
/// let items = vec![
///     CartItem::product("1", "A", 5, Money::from_cents(200)),
///     CartItem::product("2", "B", 4, Money::from_cents(1000)),
///     CartItem::product("3", "A", 5, Money::from_cents(200)),
/// ];
///
/// let groups = aggregate(&items, GroupBy::ReferenceId).unwrap();
/// assert_eq!(groups["A"].quantity, 10);
/// assert_eq!(groups["B"].quantity, 4);
/// ```
pub fn aggregate<'a, I>(items: I, group_by: GroupBy) -> CoreResult<GroupMap>
where
    I: IntoIterator<Item = &'a CartItem>,
{
    let mut groups = GroupMap::new();

    for item in items.into_iter().filter(|item| item.is_product()) {
        let key = group_by.key_for(item);

        let group = groups
            .entry(key.to_string())
            .or_insert_with(|| AggregatedGroup {
                key: key.to_string(),
                quantity: 0,
                unit_price: item.unit_price,
            });

        group.quantity = group
            .quantity
            .checked_add(item.quantity)
            .ok_or_else(|| CoreError::QuantityOutOfRange {
                key: group.key.clone(),
            })?;
        group.unit_price = item.unit_price;
    }

    trace!(%group_by, groups = groups.len(), "Aggregated cart items");
    Ok(groups)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str, ref_id: &str, qty: i64, cents: i64) -> CartItem {
        CartItem::product(id, ref_id, qty, Money::from_cents(cents))
    }

    #[test]
    fn test_merges_same_reference_id() {
        let items = vec![
            product("1", "A", 5, 200),
            product("2", "B", 4, 1000),
            product("3", "A", 5, 200),
        ];

        let groups = aggregate(&items, GroupBy::ReferenceId).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["A"].quantity, 10);
        assert_eq!(groups["A"].unit_price.cents(), 200);
        assert_eq!(groups["B"].quantity, 4);
    }

    #[test]
    fn test_last_item_price_wins() {
        let items = vec![product("1", "A", 3, 500), product("2", "A", 3, 300)];
        let groups = aggregate(&items, GroupBy::ReferenceId).unwrap();
        assert_eq!(groups["A"].unit_price.cents(), 300);

        let reversed = vec![product("2", "A", 3, 300), product("1", "A", 3, 500)];
        let groups = aggregate(&reversed, GroupBy::ReferenceId).unwrap();
        assert_eq!(groups["A"].unit_price.cents(), 500);
        assert_eq!(groups["A"].quantity, 6);
    }

    #[test]
    fn test_ignores_non_products() {
        let items = vec![
            product("1", "A", 5, 200),
            CartItem::new("promo", "promotion", 10, Money::from_cents(-100)),
        ];

        let groups = aggregate(&items, GroupBy::Type).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["product"].quantity, 5);
    }

    #[test]
    fn test_group_by_label() {
        let items = vec![
            product("1", "A", 2, 100).with_label("Cola"),
            product("2", "B", 3, 150).with_label("Cola"),
            product("3", "C", 1, 900),
        ];

        let groups = aggregate(&items, GroupBy::Label).unwrap();

        assert_eq!(groups["Cola"].quantity, 5);
        assert_eq!(groups["Cola"].unit_price.cents(), 150);
        assert_eq!(groups[""].quantity, 1);
    }

    #[test]
    fn test_group_by_type_collapses_all_products() {
        let items = vec![product("1", "A", 2, 100), product("2", "B", 3, 700)];
        let groups = aggregate(&items, GroupBy::Type).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["product"].quantity, 5);
        assert_eq!(groups["product"].unit_price.cents(), 700);
    }

    #[test]
    fn test_quantity_overflow_is_an_error() {
        let items = vec![
            CartItem::new("1", "product", i64::MAX, Money::zero()),
            CartItem::new("2", "product", 1, Money::zero()),
        ];

        assert!(matches!(
            aggregate(&items, GroupBy::Type),
            Err(CoreError::QuantityOutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let groups = aggregate(&Vec::<CartItem>::new(), GroupBy::Label).unwrap();
        assert!(groups.is_empty());
    }
}
