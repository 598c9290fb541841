use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Value Objects
// ============================================================================

/// An order together with its line items.
///
/// `total_price` is a snapshot taken at creation time and is never
/// recomputed from the (possibly re-priced) catalog on later reads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub total_price: f64,
    pub products: Vec<OrderedProduct>,
}

/// A line item. Only `product_id` and `quantity` are persisted; the
/// descriptive fields are filled in from the catalog when an order is read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderedProduct {
    pub product_id: String,
    pub quantity: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// A product id and quantity as supplied by the caller of `create_order`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RequestedItem {
    pub product_id: String,
    pub quantity: u32,
}

impl OrderedProduct {
    /// Line item as it comes back from the order store, before enrichment.
    pub fn stored(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            name: None,
            description: None,
            price: None,
        }
    }

    /// `price × quantity`, treating an unknown price as zero.
    pub fn line_total(&self) -> f64 {
        self.price.unwrap_or(0.0) * f64::from(self.quantity)
    }
}

impl Order {
    /// Sum of `price × quantity` over the line items, in line-item order.
    pub fn computed_total(products: &[OrderedProduct]) -> f64 {
        products.iter().map(OrderedProduct::line_total).sum()
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.product_id.as_str())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
