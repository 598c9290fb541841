use serde::{Deserialize, Serialize};

// ============================================================================
// Collaborator Models
// ============================================================================
//
// Shapes returned by the account and catalog services. The order service
// only reads these; it never writes to either collaborator.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}
