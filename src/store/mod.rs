// ============================================================================
// Order Store - persistence collaborator
// ============================================================================
//
// The lifecycle manager only needs four things from storage: insert a new
// order, fetch one by id, list a user's orders, and a compare-and-set on the
// status column. Status changes are never read-then-written by the caller;
// each back end applies `StatusChange` atomically.
//
// ============================================================================

mod memory;
mod scylla_store;

pub use memory::InMemoryOrderStore;
pub use scylla_store::ScyllaOrderStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, StatusChange};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order already exists: {0}")]
    Duplicate(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt order row {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

impl StoreError {
    pub fn database(err: impl std::fmt::Display) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result of a conditional status write.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    /// Condition held; carries the order as written.
    Applied(Order),
    /// Stored status was outside the expected set; carries the current order.
    Rejected(Order),
    /// No order with that id.
    Missing,
}

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Atomically apply `change` if the stored status is still expected.
    async fn change_status(&self, id: Uuid, change: &StatusChange) -> Result<ChangeOutcome, StoreError>;

    /// Orders where `user_id` is the buyer or the seller.
    async fn list_for_participant(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}
