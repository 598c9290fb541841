// ============================================================================
// Order Store
// ============================================================================
//
// Persistence for order headers and their line items. Writes are a single
// all-or-nothing unit of work; reads return the raw joined rows that
// `rows_to_orders` folds back into aggregates.
//
// Only product id and quantity are stored per line item. Names, descriptions
// and prices belong to the catalog and are joined in at read time.
//
// ============================================================================

#[cfg(test)]
pub mod memory;
mod order_store;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::order::{Order, OrderError, OrderRow};

pub use order_store::{create_pool, PostgresOrderStore};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the header and every line item, or nothing at all.
    ///
    /// `order.id` must be assigned by the caller. A duplicate id fails with
    /// `OrderError::Conflict`.
    async fn write(&self, order: &Order) -> Result<(), OrderError>;

    /// Joined header/line-item rows for one account, sorted by order id and
    /// then by line-item position.
    async fn rows_for_account(&self, account_id: &str) -> Result<Vec<OrderRow>, OrderError>;
}

/// Check an order before any I/O and return its quantities in store form.
pub fn validate_for_write(order: &Order) -> Result<Vec<i32>, OrderError> {
    if order.id.is_empty() {
        return Err(OrderError::InvalidArgument("order id must be assigned".into()));
    }

    if order.products.is_empty() {
        return Err(OrderError::InvalidArgument(format!(
            "order {} has no products",
            order.id
        )));
    }

    // One row per (order, product) in the store.
    let mut seen: HashSet<&str> = HashSet::with_capacity(order.products.len());
    if let Some(repeated) = order
        .products
        .iter()
        .find(|item| !seen.insert(item.product_id.as_str()))
    {
        return Err(OrderError::InvalidArgument(format!(
            "product {} appears more than once in order {}",
            repeated.product_id, order.id
        )));
    }

    order
        .products
        .iter()
        .map(|item| match i32::try_from(item.quantity) {
            Ok(quantity) if quantity > 0 => Ok(quantity),
            _ => Err(OrderError::InvalidArgument(format!(
                "invalid quantity {} for product {}",
                item.quantity, item.product_id
            ))),
        })
        .collect()
}
