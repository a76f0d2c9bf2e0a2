use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChangeOutcome, OrderStore, StoreError};
use crate::domain::order::{Order, StatusChange};

/// Process-local store. The status compare-and-set runs under the write
/// lock, so concurrent changes to one order serialize.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate(order.id));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn change_status(&self, id: Uuid, change: &StatusChange) -> Result<ChangeOutcome, StoreError> {
        let mut orders = self.orders.write().await;

        let Some(order) = orders.get_mut(&id) else {
            return Ok(ChangeOutcome::Missing);
        };
        if !change.permits(order.status) {
            return Ok(ChangeOutcome::Rejected(order.clone()));
        }

        order.apply_status_change(change);
        Ok(ChangeOutcome::Applied(order.clone()))
    }

    async fn list_for_participant(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|order| order.is_participant(user_id))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
