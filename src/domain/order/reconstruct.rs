use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::errors::OrderError;
use super::value_objects::{Order, OrderedProduct};

// ============================================================================
// Row-to-Aggregate Reconstruction
// ============================================================================
//
// The order store returns one row per (order, line item) from a join of the
// order header table and the line item table. Rows must arrive grouped by
// order id; the fold below turns them back into nested `Order` aggregates.
//
// ============================================================================

/// One row of the `orders ⟕ order_products` join.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub order_id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub total_price: f64,
    pub product_id: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconstructError {
    #[error("rows for order {0} are not contiguous")]
    NotContiguous(String),

    #[error("order {0} has a line item with only some columns set")]
    PartialLineItem(String),
}

impl From<ReconstructError> for OrderError {
    fn from(err: ReconstructError) -> Self {
        OrderError::Internal(err.to_string())
    }
}

impl OrderRow {
    fn line_item(&self) -> Result<Option<OrderedProduct>, ReconstructError> {
        match (&self.product_id, self.quantity) {
            (Some(product_id), Some(quantity)) => {
                Ok(Some(OrderedProduct::stored(product_id.clone(), quantity)))
            }
            // Outer join row for an order without line items.
            (None, None) => Ok(None),
            _ => Err(ReconstructError::PartialLineItem(self.order_id.clone())),
        }
    }

    fn into_order(self, first_item: Option<OrderedProduct>) -> Order {
        Order {
            id: self.order_id,
            account_id: self.account_id,
            created_at: self.created_at,
            total_price: self.total_price,
            products: first_item.into_iter().collect(),
        }
    }
}

/// Fold rows grouped by order id into orders, keeping both the order of the
/// groups and the order of line items inside each group.
///
/// Fails instead of interleaving items when an order id shows up again after
/// a different order's rows.
pub fn rows_to_orders<I>(rows: I) -> Result<Vec<Order>, ReconstructError>
where
    I: IntoIterator<Item = OrderRow>,
{
    let mut closed: HashSet<String> = HashSet::new();

    rows.into_iter().try_fold(Vec::new(), |mut orders: Vec<Order>, row| {
        let item = row.line_item()?;

        match orders.last_mut() {
            Some(current) if current.id == row.order_id => {
                current.products.extend(item);
            }
            previous => {
                if let Some(previous) = previous {
                    closed.insert(previous.id.clone());
                }
                if closed.contains(&row.order_id) {
                    return Err(ReconstructError::NotContiguous(row.order_id));
                }
                orders.push(row.into_order(item));
            }
        }

        Ok(orders)
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
