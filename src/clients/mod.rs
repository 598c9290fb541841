// ============================================================================
// Collaborator Clients
// ============================================================================
//
// Narrow contracts for the two services the order service depends on:
// - accounts: look up an account by id
// - catalog:  resolve many product ids in one batched call
//
// Handlers receive these as `Arc<dyn ...>` so tests can substitute fakes.
//
// ============================================================================

mod account;
mod catalog;
pub mod proto;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use crate::models::{Account, Product};
use crate::utils::CircuitBreakerError;

pub use account::GrpcAccountClient;
pub use catalog::GrpcCatalogClient;

#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn get_account(&self, id: &str) -> Result<Account, CollaboratorError>;
}

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Ids missing from the catalog are absent from the result, not an error.
    async fn get_products(&self, ids: &BTreeSet<String>) -> Result<Vec<Product>, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("circuit breaker for {0} is open")]
    CircuitOpen(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl CollaboratorError {
    /// Whether the error says the collaborator itself is unhealthy.
    pub fn is_outage(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Unavailable(_) | CollaboratorError::CircuitOpen(_)
        )
    }
}

impl From<tonic::Status> for CollaboratorError {
    fn from(status: tonic::Status) -> Self {
        use tonic::Code;

        let message = status.message().to_string();
        match status.code() {
            Code::NotFound => CollaboratorError::NotFound(message),
            Code::Unavailable
            | Code::DeadlineExceeded
            | Code::ResourceExhausted
            | Code::Cancelled => CollaboratorError::Unavailable(message),
            code => CollaboratorError::Protocol(format!("{code:?}: {message}")),
        }
    }
}

impl From<CircuitBreakerError<CollaboratorError>> for CollaboratorError {
    fn from(err: CircuitBreakerError<CollaboratorError>) -> Self {
        match err {
            CircuitBreakerError::CircuitOpen(name) => CollaboratorError::CircuitOpen(name),
            CircuitBreakerError::OperationFailed(err) => err,
        }
    }
}

/// Build a channel that connects on first use, with a per-request timeout.
pub fn lazy_channel(
    url: &str,
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<Channel, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(url.to_string())?
        .timeout(request_timeout)
        .connect_timeout(connect_timeout);

    Ok(endpoint.connect_lazy())
}
