use serde::Serialize;

use crate::utils::IsTransient;

// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Order must contain at least one product")]
    EmptyOrder,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Could not resolve products: {0}")]
    ProductResolutionFailed(String),

    #[error("Order already exists: {0}")]
    Conflict(String),

    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used for retry decisions and transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input, rejected before any side effect. Never retried.
    Validation,
    NotFound,
    /// Duplicate identifier. The caller may pick a new id and retry.
    Conflict,
    /// Downstream unreachable. Safe to retry with backoff.
    Unavailable,
    Internal,
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::InvalidArgument(_) | OrderError::EmptyOrder => ErrorKind::Validation,
            OrderError::AccountNotFound(_) => ErrorKind::NotFound,
            OrderError::Conflict(_) => ErrorKind::Conflict,
            OrderError::Unavailable(_) | OrderError::ProductResolutionFailed(_) => {
                ErrorKind::Unavailable
            }
            OrderError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            OrderError::InvalidArgument(_) => "invalid_argument",
            OrderError::EmptyOrder => "empty_order",
            OrderError::AccountNotFound(_) => "account_not_found",
            OrderError::ProductResolutionFailed(_) => "product_resolution_failed",
            OrderError::Conflict(_) => "conflict",
            OrderError::Unavailable(_) => "unavailable",
            OrderError::Internal(_) => "internal",
        }
    }
}

impl IsTransient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(self, OrderError::Unavailable(_))
    }
}
