use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join;

use crate::clients::{AccountLookup, CatalogLookup};
use crate::metrics::Metrics;
use crate::models::Product;
use crate::store::OrderRepository;
use crate::utils::{Clock, IdGenerator, SystemClock, UuidV7Generator};

use super::commands::CreateOrder;
use super::errors::OrderError;
use super::value_objects::{Order, OrderedProduct};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: account check + catalog batch → match → total → store
//
// ============================================================================

pub struct OrderCommandHandler {
    accounts: Arc<dyn AccountLookup>,
    catalog: Arc<dyn CatalogLookup>,
    store: Arc<dyn OrderRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        accounts: Arc<dyn AccountLookup>,
        catalog: Arc<dyn CatalogLookup>,
        store: Arc<dyn OrderRepository>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            accounts,
            catalog,
            store,
            ids: Arc::new(UuidV7Generator),
            clock: Arc::new(SystemClock),
            metrics,
        }
    }

    #[cfg(test)]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the account, resolve the requested products in one catalog
    /// batch, price the order and persist it.
    ///
    /// Requested products the catalog does not know, and products requested
    /// with quantity zero, are dropped from the order rather than failing it.
    /// The call fails with `EmptyOrder` only when nothing is left.
    pub async fn create_order(&self, command: CreateOrder) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.handle_create(command).await;

        self.metrics.record_request(
            "create_order",
            started.elapsed().as_secs_f64(),
            result.as_ref().err().map(OrderError::label),
        );
        result
    }

    async fn handle_create(&self, command: CreateOrder) -> Result<Order, OrderError> {
        if command.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let requested_ids: BTreeSet<String> = command
            .items
            .iter()
            .map(|item| item.product_id.clone())
            .collect();

        tracing::info!(
            account_id = %command.account_id,
            requested_items = command.items.len(),
            "Creating order"
        );

        // Independent lookups; both must finish before matching.
        let (account, catalog) = join(
            self.accounts.get_account(&command.account_id),
            self.catalog.get_products(&requested_ids),
        )
        .await;
        self.metrics.record_catalog_lookup("create_order");

        if let Err(err) = account {
            tracing::warn!(
                account_id = %command.account_id,
                error = %err,
                "Account validation failed"
            );
            return Err(OrderError::AccountNotFound(command.account_id));
        }

        let products = catalog.map_err(|err| {
            tracing::warn!(error = %err, "Catalog lookup failed");
            OrderError::ProductResolutionFailed(err.to_string())
        })?;

        let line_items = match_requested_items(&command, &products);

        let dropped = requested_ids.len() - line_items.len();
        if dropped > 0 {
            self.metrics.requested_items_dropped.inc_by(dropped as u64);
            tracing::debug!(
                account_id = %command.account_id,
                dropped = dropped,
                "Dropped requested items without a catalog match or quantity"
            );
        }

        if line_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let order = Order {
            id: self.ids.next_id(),
            account_id: command.account_id,
            created_at: self.clock.now(),
            total_price: Order::computed_total(&line_items),
            products: line_items,
        };

        self.store.write(&order).await?;
        self.metrics.orders_created.inc();

        tracing::info!(
            order_id = %order.id,
            account_id = %order.account_id,
            item_count = order.products.len(),
            total_price = order.total_price,
            "Order created"
        );

        Ok(order)
    }
}

/// Build line items for every catalog product the command asks for with a
/// positive quantity, in catalog order.
///
/// Works the same whether the catalog returned only the requested ids or its
/// whole listing; anything not requested is skipped.
fn match_requested_items(command: &CreateOrder, products: &[Product]) -> Vec<OrderedProduct> {
    let mut seen: HashSet<&str> = HashSet::new();

    products
        .iter()
        .filter(|product| seen.insert(product.id.as_str()))
        .filter_map(|product| {
            let quantity = command
                .requested_quantity(&product.id)
                .filter(|quantity| *quantity > 0)?;

            Some(OrderedProduct {
                product_id: product.id.clone(),
                quantity,
                name: Some(product.name.clone()),
                description: Some(product.description.clone()),
                price: Some(product.price),
            })
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================
