//! Self-maintaining order fields.
//!
//! A row that derives [`Ordered`](storefront_derive::Ordered) names the field its order is
//! unique for.  When such a row is first saved without an order, the write path calls
//! [`assign_order`] with the orders of the rows sharing its parent key, and the row receives
//! one more than the largest of them (or 1 when it has no siblings).  An explicit order is never
//! recomputed here; collisions are the business of [`crate::validate`].
//!
//! ```rust
//! use storefront::{Order, ProductId};
//!
//! #[derive(storefront::Ordered)]
//! #[ordered(unique_for = "product_id")]
//! struct Row {
//!     product_id: ProductId,
//!     order: Option<Order>,
//! }
//! ```
//!
//! A misconfigured derive is rejected when the type is defined.  Without `unique_for`:
//!
//! ```compile_fail
//! use storefront::{Order, ProductId};
//!
//! #[derive(storefront::Ordered)]
//! struct Row {
//!     product_id: ProductId,
//!     order: Option<Order>,
//! }
//! ```
//!
//! With a `unique_for` that names no field:
//!
//! ```compile_fail
//! use storefront::{Order, ProductId};
//!
//! #[derive(storefront::Ordered)]
//! #[ordered(unique_for = "category_id")]
//! struct Row {
//!     product_id: ProductId,
//!     order: Option<Order>,
//! }
//! ```
//!
//! Without the order field:
//!
//! ```compile_fail
//! use storefront::{Order, ProductId};
//!
//! #[derive(storefront::Ordered)]
//! #[ordered(unique_for = "product_id", field = "position")]
//! struct Row {
//!     product_id: ProductId,
//!     order: Option<Order>,
//! }
//! ```

use crate::Order;

/// A write-side row whose order is scoped to a parent key.
pub trait Ordered {
    /// Type of the parent key the order is unique for.
    type Parent: PartialEq;

    /// Name of the parent-key field, as given to `#[ordered(unique_for = "...")]`.
    const UNIQUE_FOR_FIELD: &'static str;

    /// The parent key of this row.
    fn parent_key(&self) -> &Self::Parent;

    /// The order, if one was supplied or already assigned.
    fn order(&self) -> Option<Order>;

    /// Records the order of this row.
    fn set_order(&mut self, order: Order);
}

/// Returns the order a new row takes after `sibling_orders`.
///
/// The iterator must already be restricted to rows sharing the new row's parent key.
pub fn next_order(sibling_orders: impl IntoIterator<Item = Order>) -> Order {
    sibling_orders
        .into_iter()
        .max()
        .map(|order| order.saturating_add(1))
        .unwrap_or(1)
}

/// Returns the order a new row takes among `rows`, considering only rows whose parent key
/// equals `parent`.
pub fn next_order_for<'a, P: PartialEq + 'a>(
    parent: &P,
    rows: impl IntoIterator<Item = (&'a P, Order)>,
) -> Order {
    next_order(
        rows.into_iter()
            .filter(|(row_parent, _)| *row_parent == parent)
            .map(|(_, order)| order),
    )
}

/// Fills in the order of `row` when it has none and returns the effective order.
pub fn assign_order<T: Ordered>(row: &mut T, sibling_orders: impl IntoIterator<Item = Order>) -> Order {
    match row.order() {
        Some(order) => order,
        None => {
            let order = next_order(sibling_orders);
            row.set_order(order);
            order
        }
    }
}
