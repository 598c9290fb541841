use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use crate::clients::CatalogLookup;
use crate::metrics::Metrics;
use crate::models::Product;
use crate::store::OrderRepository;
use crate::utils::{retry_on_transient, RetryConfig};

use super::errors::OrderError;
use super::reconstruct::rows_to_orders;
use super::value_objects::Order;

// ============================================================================
// Order Query Handler
// ============================================================================
//
// Read path: store rows → orders → one catalog batch → enriched orders
//
// ============================================================================

pub struct OrderQueryHandler {
    store: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogLookup>,
    retry: RetryConfig,
    metrics: Arc<Metrics>,
}

impl OrderQueryHandler {
    pub fn new(
        store: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogLookup>,
        retry: RetryConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            catalog,
            retry,
            metrics,
        }
    }

    /// Every order of `account_id` with line items enriched from the catalog.
    ///
    /// Prices on the line items are current catalog prices, while
    /// `total_price` stays what was charged at creation. Products the
    /// catalog no longer knows keep their id and quantity only.
    pub async fn get_orders_for_account(&self, account_id: &str) -> Result<Vec<Order>, OrderError> {
        let started = Instant::now();
        let result = self.handle_get(account_id).await;

        self.metrics.record_request(
            "get_orders_for_account",
            started.elapsed().as_secs_f64(),
            result.as_ref().err().map(OrderError::label),
        );
        result
    }

    async fn handle_get(&self, account_id: &str) -> Result<Vec<Order>, OrderError> {
        let rows = retry_on_transient("rows_for_account", self.retry.clone(), |attempt| {
            if attempt > 1 {
                self.metrics.store_read_retries.inc();
            }
            let store = self.store.clone();
            let account_id = account_id.to_string();
            async move { store.rows_for_account(&account_id).await }
        })
        .await
        .into_result()?;

        let mut orders = rows_to_orders(rows)?;

        let product_ids: BTreeSet<String> = orders
            .iter()
            .flat_map(|order| order.product_ids())
            .map(str::to_string)
            .collect();

        if product_ids.is_empty() {
            tracing::debug!(account_id = %account_id, order_count = orders.len(), "No line items to enrich");
            return Ok(orders);
        }

        let products = self.catalog.get_products(&product_ids).await.map_err(|err| {
            tracing::warn!(account_id = %account_id, error = %err, "Catalog lookup failed");
            OrderError::ProductResolutionFailed(err.to_string())
        })?;
        self.metrics.record_catalog_lookup("get_orders_for_account");

        let unmatched = enrich(&mut orders, &products);
        if unmatched > 0 {
            self.metrics.unmatched_products.inc_by(unmatched as u64);
            tracing::warn!(
                account_id = %account_id,
                unmatched = unmatched,
                "Line items reference products missing from the catalog"
            );
        }

        tracing::debug!(
            account_id = %account_id,
            order_count = orders.len(),
            distinct_products = product_ids.len(),
            "Loaded orders"
        );

        Ok(orders)
    }
}

/// Fill in descriptive fields from `products`; returns how many line items
/// found no match.
fn enrich(orders: &mut [Order], products: &[Product]) -> usize {
    let mut by_id: HashMap<&str, &Product> = HashMap::with_capacity(products.len());
    for product in products {
        by_id.entry(product.id.as_str()).or_insert(product);
    }

    let mut unmatched = 0;
    for item in orders.iter_mut().flat_map(|order| order.products.iter_mut()) {
        match by_id.get(item.product_id.as_str()) {
            Some(product) => {
                item.name = Some(product.name.clone());
                item.description = Some(product.description.clone());
                item.price = Some(product.price);
            }
            None => unmatched += 1,
        }
    }
    unmatched
}

// ============================================================================
// Unit Tests
// ============================================================================
