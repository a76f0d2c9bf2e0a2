use uuid::Uuid;

use super::value_objects::{Money, OrderStatus};
use crate::identity::IdentityError;
use crate::store::StoreError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Cancellation refused; carries the status the order is actually in.
    #[error("Cannot cancel an order in status: {0}")]
    InvalidState(OrderStatus),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order total {total} does not equal subtotal {subtotal} + tax {tax} + shipping {shipping}")]
    InvalidTotals {
        subtotal: Money,
        tax: Money,
        shipping: Money,
        total: Money,
    },

    #[error("Amount cannot be negative: {0}")]
    InvalidAmount(i64),

    #[error("Buyer cannot purchase their own artwork")]
    SelfPurchase,

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Order store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<IdentityError> for OrderError {
    fn from(err: IdentityError) -> Self {
        OrderError::Unauthorized(err.to_string())
    }
}

impl OrderError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::NotFound(_) => "not_found",
            OrderError::Unauthorized(_) => "unauthorized",
            OrderError::Forbidden(_) => "forbidden",
            OrderError::InvalidState(_) => "invalid_state",
            OrderError::InvalidTransition { .. } => "invalid_transition",
            OrderError::InvalidTotals { .. } => "invalid_totals",
            OrderError::InvalidAmount(_) => "invalid_amount",
            OrderError::SelfPurchase => "self_purchase",
            OrderError::UnknownStatus(_) => "unknown_status",
            OrderError::Store(_) => "store",
        }
    }
}
