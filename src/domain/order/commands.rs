use serde::Deserialize;

use super::value_objects::RequestedItem;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub account_id: String,
    #[serde(rename = "products")]
    pub items: Vec<RequestedItem>,
}

impl CreateOrder {
    #[cfg(test)]
    pub fn new(account_id: impl Into<String>, items: Vec<RequestedItem>) -> Self {
        Self {
            account_id: account_id.into(),
            items,
        }
    }

    /// Quantity of the first request for `product_id`, if any.
    pub fn requested_quantity(&self, product_id: &str) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
    }
}
