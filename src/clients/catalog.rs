use std::collections::BTreeSet;

use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::GrpcMethod;

use super::proto::{GetProductsRequest, GetProductsResponse, CATALOG_SERVICE, GET_PRODUCTS_PATH};
use super::{CatalogLookup, CollaboratorError};
use crate::models::Product;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig};

/// gRPC client for the catalog service. Every lookup is a single batched
/// `GetProducts` call regardless of how many ids are requested.
#[derive(Clone)]
pub struct GrpcCatalogClient {
    inner: Grpc<Channel>,
    circuit_breaker: CircuitBreaker,
}

impl GrpcCatalogClient {
    pub fn new(channel: Channel, breaker_config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Grpc::new(channel),
            circuit_breaker: CircuitBreaker::new("catalog", breaker_config),
        }
    }

    async fn fetch(&self, ids: &BTreeSet<String>) -> Result<Vec<Product>, CollaboratorError> {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| CollaboratorError::Unavailable(format!("catalog service not ready: {e}")))?;

        let mut request = tonic::Request::new(GetProductsRequest::for_ids(ids));
        request
            .extensions_mut()
            .insert(GrpcMethod::new(CATALOG_SERVICE, "GetProducts"));

        let response: tonic::Response<GetProductsResponse> = grpc
            .unary(
                request,
                PathAndQuery::from_static(GET_PRODUCTS_PATH),
                tonic_prost::ProstCodec::default(),
            )
            .await?;

        Ok(response
            .into_inner()
            .products
            .into_iter()
            .map(Product::from)
            .collect())
    }
}

#[async_trait]
impl CatalogLookup for GrpcCatalogClient {
    async fn get_products(&self, ids: &BTreeSet<String>) -> Result<Vec<Product>, CollaboratorError> {
        let products = self
            .circuit_breaker
            .call(CollaboratorError::is_outage, self.fetch(ids))
            .await
            .map_err(CollaboratorError::from)?;

        tracing::debug!(
            requested = ids.len(),
            returned = products.len(),
            "Catalog batch lookup completed"
        );
        Ok(products)
    }
}
