use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{validate_for_write, OrderRepository};
use crate::domain::order::{Order, OrderError, OrderRow};

/// Where an injected failure interrupts a write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePoint {
    AfterHeaderInsert,
    BeforeCommit,
}

#[derive(Debug, Clone)]
pub struct HeaderRecord {
    pub id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub total_price: f64,
}

#[derive(Debug, Clone)]
pub struct LineItemRecord {
    pub order_id: String,
    pub position: i32,
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Default)]
struct Tables {
    orders: Vec<HeaderRecord>,
    order_products: Vec<LineItemRecord>,
}

/// Two-table order store with the same all-or-nothing write contract as the
/// Postgres store, plus hooks for injecting failures.
#[derive(Default)]
pub struct InMemoryOrderStore {
    tables: Mutex<Tables>,
    fail_write_at: Mutex<Option<FailurePoint>>,
    unavailable_reads: AtomicUsize,
    reads: AtomicUsize,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_write_at(&self, point: FailurePoint) {
        *self.fail_write_at.lock().unwrap() = Some(point);
    }

    /// Make the next `count` reads fail with `Unavailable`.
    pub fn fail_next_reads(&self, count: usize) {
        self.unavailable_reads.store(count, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn order_count(&self) -> usize {
        self.tables.lock().unwrap().orders.len()
    }

    pub fn line_item_count(&self) -> usize {
        self.tables.lock().unwrap().order_products.len()
    }

    /// Insert a bare header, as an outer join would see an order with no items.
    pub fn insert_header_only(&self, header: HeaderRecord) {
        self.tables.lock().unwrap().orders.push(header);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn write(&self, order: &Order) -> Result<(), OrderError> {
        let quantities = validate_for_write(order)?;
        let fail_at = self.fail_write_at.lock().unwrap().take();

        let mut tables = self.tables.lock().unwrap();
        if tables.orders.iter().any(|o| o.id == order.id) {
            return Err(OrderError::Conflict(order.id.clone()));
        }

        let savepoint = (tables.orders.len(), tables.order_products.len());
        let rollback = |tables: &mut Tables| {
            tables.orders.truncate(savepoint.0);
            tables.order_products.truncate(savepoint.1);
        };

        tables.orders.push(HeaderRecord {
            id: order.id.clone(),
            account_id: order.account_id.clone(),
            created_at: order.created_at,
            total_price: order.total_price,
        });

        if fail_at == Some(FailurePoint::AfterHeaderInsert) {
            rollback(&mut *tables);
            return Err(OrderError::Unavailable("injected failure after header insert".into()));
        }

        for (position, (item, quantity)) in order.products.iter().zip(quantities).enumerate() {
            tables.order_products.push(LineItemRecord {
                order_id: order.id.clone(),
                position: position as i32,
                product_id: item.product_id.clone(),
                quantity,
            });
        }

        if fail_at == Some(FailurePoint::BeforeCommit) {
            rollback(&mut *tables);
            return Err(OrderError::Unavailable("injected failure before commit".into()));
        }

        Ok(())
    }

    async fn rows_for_account(&self, account_id: &str) -> Result<Vec<OrderRow>, OrderError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let pending = self.unavailable_reads.load(Ordering::SeqCst);
        if pending > 0 {
            self.unavailable_reads.store(pending - 1, Ordering::SeqCst);
            return Err(OrderError::Unavailable("injected read failure".into()));
        }

        let tables = self.tables.lock().unwrap();
        let mut headers: Vec<&HeaderRecord> = tables
            .orders
            .iter()
            .filter(|o| o.account_id == account_id)
            .collect();
        headers.sort_by(|a, b| a.id.cmp(&b.id));

        let mut rows = Vec::new();
        for header in headers {
            let mut items: Vec<&LineItemRecord> = tables
                .order_products
                .iter()
                .filter(|item| item.order_id == header.id)
                .collect();
            items.sort_by_key(|item| item.position);

            let row = |product_id: Option<String>, quantity: Option<u32>| OrderRow {
                order_id: header.id.clone(),
                account_id: header.account_id.clone(),
                created_at: header.created_at,
                total_price: header.total_price,
                product_id,
                quantity,
            };

            if items.is_empty() {
                rows.push(row(None, None));
            }
            for item in items {
                rows.push(row(Some(item.product_id.clone()), Some(item.quantity as u32)));
            }
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{rows_to_orders, OrderedProduct};

    fn order(id: &str, account_id: &str, products: &[(&str, u32)]) -> Order {
        Order {
            id: id.to_string(),
            account_id: account_id.to_string(),
            created_at: Utc::now(),
            total_price: 0.0,
            products: products
                .iter()
                .map(|(p, q)| OrderedProduct::stored(*p, *q))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_failure_after_header_leaves_no_rows() {
        let store = InMemoryOrderStore::new();
        store.fail_next_write_at(FailurePoint::AfterHeaderInsert);

        let result = store.write(&order("O1", "A1", &[("P1", 1), ("P2", 2)])).await;

        assert!(matches!(result, Err(OrderError::Unavailable(_))));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.line_item_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_before_commit_leaves_no_rows() {
        let store = InMemoryOrderStore::new();
        store.write(&order("O1", "A1", &[("P1", 1)])).await.unwrap();
        store.fail_next_write_at(FailurePoint::BeforeCommit);

        let result = store.write(&order("O2", "A1", &[("P1", 1), ("P2", 2)])).await;

        assert!(result.is_err());
        assert_eq!(store.order_count(), 1);
        assert_eq!(store.line_item_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_quantity_writes_nothing() {
        let store = InMemoryOrderStore::new();

        let result = store.write(&order("O1", "A1", &[("P1", 1), ("P2", 0)])).await;

        assert!(matches!(result, Err(OrderError::InvalidArgument(_))));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.line_item_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_product_writes_nothing() {
        let store = InMemoryOrderStore::new();

        let result = store.write(&order("O1", "A1", &[("P1", 1), ("P1", 2)])).await;

        assert!(matches!(result, Err(OrderError::InvalidArgument(_))));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.line_item_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_writers_with_same_id_have_one_winner() {
        let store = InMemoryOrderStore::new();
        let first = order("O1", "A1", &[("P1", 1)]);
        let second = order("O1", "A2", &[("P2", 3)]);

        let (a, b) = tokio::join!(store.write(&first), store.write(&second));

        let conflicts = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(OrderError::Conflict(_))))
            .count();
        assert_eq!(conflicts, 1);
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(store.order_count(), 1);
        assert_eq!(store.line_item_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = InMemoryOrderStore::new();
        store.write(&order("O1", "A1", &[("P1", 1)])).await.unwrap();

        let result = store.write(&order("O1", "A2", &[("P9", 3)])).await;

        assert_eq!(result, Err(OrderError::Conflict("O1".into())));
        assert_eq!(store.line_item_count(), 1);
    }

    #[tokio::test]
    async fn test_rows_are_sorted_and_scoped_to_account() {
        let store = InMemoryOrderStore::new();
        store.write(&order("O2", "A1", &[("P3", 1)])).await.unwrap();
        store.write(&order("O9", "A2", &[("P1", 1)])).await.unwrap();
        store.write(&order("O1", "A1", &[("P2", 1), ("P1", 4)])).await.unwrap();

        let orders = rows_to_orders(store.rows_for_account("A1").await.unwrap()).unwrap();

        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["O1", "O2"]);
        assert_eq!(orders[0].product_ids().collect::<Vec<_>>(), vec!["P2", "P1"]);
    }
}
