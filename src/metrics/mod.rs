use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers both order paths:
// - creation: orders created, requested items dropped by best-effort match
// - retrieval: catalog batch lookups, products missing from the catalog
// - failures by operation and error label, request latency
// - store read retries
//
// Exposed as Prometheus text on GET /metrics by the http module.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub requested_items_dropped: IntCounter,
    pub catalog_batch_lookups: IntCounterVec,
    pub unmatched_products: IntCounter,
    pub request_failures: IntCounterVec,
    pub request_duration: HistogramVec,
    pub store_read_retries: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders persisted")?;
        registry.register(Box::new(orders_created.clone()))?;

        let requested_items_dropped = IntCounter::new(
            "order_requested_items_dropped_total",
            "Requested items dropped because the catalog did not resolve them or their quantity was zero",
        )?;
        registry.register(Box::new(requested_items_dropped.clone()))?;

        let catalog_batch_lookups = IntCounterVec::new(
            Opts::new("catalog_batch_lookups_total", "Batched catalog lookups issued"),
            &["operation"],
        )?;
        registry.register(Box::new(catalog_batch_lookups.clone()))?;

        let unmatched_products = IntCounter::new(
            "order_unmatched_products_total",
            "Line items left unenriched because the catalog no longer has the product",
        )?;
        registry.register(Box::new(unmatched_products.clone()))?;

        let request_failures = IntCounterVec::new(
            Opts::new("order_request_failures_total", "Failed order requests"),
            &["operation", "error"],
        )?;
        registry.register(Box::new(request_failures.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("order_request_duration_seconds", "Order request duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let store_read_retries = IntCounter::new(
            "order_store_read_retries_total",
            "Store reads retried after a transient failure",
        )?;
        registry.register(Box::new(store_read_retries.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            requested_items_dropped,
            catalog_batch_lookups,
            unmatched_products,
            request_failures,
            request_duration,
            store_read_retries,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_request(&self, operation: &str, duration_secs: f64, error: Option<&str>) {
        if let Some(error) = error {
            self.request_failures.with_label_values(&[operation, error]).inc();
        }
        self.request_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_catalog_lookup(&self, operation: &str) {
        self.catalog_batch_lookups.with_label_values(&[operation]).inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::{Encoder, TextEncoder};

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
