use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::GrpcMethod;

use super::proto::{GetAccountRequest, GetAccountResponse, ACCOUNT_SERVICE, GET_ACCOUNT_PATH};
use super::{AccountLookup, CollaboratorError};
use crate::models::Account;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig};

/// gRPC client for the account service.
#[derive(Clone)]
pub struct GrpcAccountClient {
    inner: Grpc<Channel>,
    circuit_breaker: CircuitBreaker,
}

impl GrpcAccountClient {
    pub fn new(channel: Channel, breaker_config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Grpc::new(channel),
            circuit_breaker: CircuitBreaker::new("accounts", breaker_config),
        }
    }

    async fn fetch(&self, id: &str) -> Result<Account, CollaboratorError> {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| CollaboratorError::Unavailable(format!("account service not ready: {e}")))?;

        let mut request = tonic::Request::new(GetAccountRequest { id: id.to_string() });
        request
            .extensions_mut()
            .insert(GrpcMethod::new(ACCOUNT_SERVICE, "GetAccount"));

        let response: tonic::Response<GetAccountResponse> = grpc
            .unary(
                request,
                PathAndQuery::from_static(GET_ACCOUNT_PATH),
                tonic_prost::ProstCodec::default(),
            )
            .await?;

        response
            .into_inner()
            .account
            .map(Account::from)
            .ok_or_else(|| CollaboratorError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl AccountLookup for GrpcAccountClient {
    async fn get_account(&self, id: &str) -> Result<Account, CollaboratorError> {
        let result = self
            .circuit_breaker
            .call(CollaboratorError::is_outage, self.fetch(id))
            .await
            .map_err(CollaboratorError::from);

        if let Err(err) = &result {
            tracing::debug!(account_id = %id, error = %err, "Account lookup failed");
        }
        result
    }
}
