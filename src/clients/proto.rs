//! Wire messages for the account and catalog gRPC services.
//!
//! Declared by hand with `prost::Message` so the order service does not need
//! the collaborators' `.proto` files at build time.

use crate::models::{Account, Product};

pub const ACCOUNT_SERVICE: &str = "pb.AccountService";
pub const GET_ACCOUNT_PATH: &str = "/pb.AccountService/GetAccount";

pub const CATALOG_SERVICE: &str = "pb.CatalogService";
pub const GET_PRODUCTS_PATH: &str = "/pb.CatalogService/GetProducts";

#[derive(Clone, PartialEq, prost::Message)]
pub struct AccountMessage {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetAccountRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetAccountResponse {
    #[prost(message, optional, tag = "1")]
    pub account: Option<AccountMessage>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProductMessage {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(double, tag = "4")]
    pub price: f64,
}

/// `ids` is a comma-separated list; an empty list makes the catalog return
/// its default listing instead of a filtered one.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetProductsRequest {
    #[prost(uint64, tag = "1")]
    pub skip: u64,
    #[prost(uint64, tag = "2")]
    pub take: u64,
    #[prost(string, tag = "3")]
    pub ids: String,
    #[prost(string, tag = "4")]
    pub query: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetProductsResponse {
    #[prost(message, repeated, tag = "1")]
    pub products: Vec<ProductMessage>,
}

impl From<AccountMessage> for Account {
    fn from(msg: AccountMessage) -> Self {
        Self {
            id: msg.id,
            name: msg.name,
        }
    }
}

impl From<ProductMessage> for Product {
    fn from(msg: ProductMessage) -> Self {
        Self {
            id: msg.id,
            name: msg.name,
            description: msg.description,
            price: msg.price,
        }
    }
}

impl GetProductsRequest {
    pub fn for_ids<'a>(ids: impl IntoIterator<Item = &'a String>) -> Self {
        let ids: Vec<&str> = ids.into_iter().map(String::as_str).collect();
        Self {
            skip: 0,
            take: ids.len() as u64,
            ids: ids.join(","),
            query: String::new(),
        }
    }
}
