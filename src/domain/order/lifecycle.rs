use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::aggregate::Order;
use super::commands::{OrderCommand, PlaceOrder};
use super::errors::OrderError;
use super::value_objects::{Money, OrderStatus};
use crate::identity::{Caller, IdentityResolver, Role};
use crate::metrics::Metrics;
use crate::store::{ChangeOutcome, OrderStore, StoreError};

// ============================================================================
// Order Lifecycle Manager
// ============================================================================
//
// Orchestrates: Caller + Command → Aggregate → Event → conditional write
//
// The store handle is passed in explicitly; every status change goes through
// `OrderStore::change_status`, never a read-modify-write here.
//
// ============================================================================

/// Dashboard numbers for one seller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub seller_id: Uuid,
    pub order_count: u64,
    pub by_status: BTreeMap<OrderStatus, u64>,
    /// Sum of totals over orders that were not cancelled.
    pub gross_revenue: Money,
    pub cancelled_count: u64,
}

pub struct OrderLifecycleManager {
    store: Arc<dyn OrderStore>,
    identity: Arc<dyn IdentityResolver>,
    metrics: Arc<Metrics>,
}

impl OrderLifecycleManager {
    pub fn new(
        store: Arc<dyn OrderStore>,
        identity: Arc<dyn IdentityResolver>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { store, identity, metrics }
    }

    /// Resolve a presented bearer credential into a caller.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<Caller, OrderError> {
        self.identity.authenticate(credential).map_err(|e| {
            tracing::debug!(error = %e, "Rejected credential");
            OrderError::from(e)
        })
    }

    /// Cancel an order on behalf of its buyer.
    pub async fn cancel_order(&self, order_id: Uuid, caller: &Caller) -> Result<Order, OrderError> {
        self.observe("cancel_order", order_id, self.cancel(order_id, caller))
            .await
    }

    /// Fetch an order visible to its buyer or seller.
    pub async fn get_order(&self, order_id: Uuid, caller: &Caller) -> Result<Order, OrderError> {
        self.observe("get_order", order_id, self.get(order_id, caller))
            .await
    }

    /// Create an order from a checkout request.
    pub async fn place_order(&self, caller: &Caller, request: &PlaceOrder) -> Result<Order, OrderError> {
        let order_id = Uuid::now_v7();
        self.observe("place_order", order_id, self.place(order_id, caller, request))
            .await
    }

    /// Move an order one step along the fulfilment path.
    pub async fn advance_order(
        &self,
        order_id: Uuid,
        caller: &Caller,
        to: OrderStatus,
    ) -> Result<Order, OrderError> {
        let command = OrderCommand::Advance { to, requested_by: *caller };
        self.observe("advance_order", order_id, self.transition(order_id, command))
            .await
    }

    /// Orders the caller bought or sold, newest first.
    pub async fn list_orders(&self, caller: &Caller) -> Result<Vec<Order>, OrderError> {
        self.observe("list_orders", caller.user_id, self.list(caller))
            .await
    }

    pub async fn seller_summary(&self, caller: &Caller) -> Result<SellerSummary, OrderError> {
        self.observe("seller_summary", caller.user_id, self.summary(caller))
            .await
    }

    pub async fn ping_store(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn load(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.store
            .fetch(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    async fn cancel(&self, order_id: Uuid, caller: &Caller) -> Result<Order, OrderError> {
        self.transition(order_id, OrderCommand::Cancel { requested_by: *caller })
            .await
    }

    async fn get(&self, order_id: Uuid, caller: &Caller) -> Result<Order, OrderError> {
        let order = self.load(order_id).await?;
        if !order.is_participant(caller.user_id) {
            return Err(OrderError::Forbidden(
                "caller is neither buyer nor seller of this order".to_string(),
            ));
        }
        Ok(order)
    }

    async fn place(&self, order_id: Uuid, caller: &Caller, request: &PlaceOrder) -> Result<Order, OrderError> {
        let (order, event) = Order::place(order_id, caller, request, Utc::now())?;
        self.store.insert(&order).await?;

        tracing::info!(
            order_id = %order.id,
            buyer_id = %order.buyer_id,
            seller_id = %order.seller_id,
            status = %order.status,
            total = %order.total,
            event_type = event.event_type(),
            "✅ Order placed"
        );
        Ok(order)
    }

    async fn list(&self, caller: &Caller) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.store.list_for_participant(caller.user_id).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn summary(&self, caller: &Caller) -> Result<SellerSummary, OrderError> {
        if caller.role == Role::Buyer {
            return Err(OrderError::Forbidden(
                "seller dashboard requires a seller account".to_string(),
            ));
        }

        let sold: Vec<Order> = self
            .store
            .list_for_participant(caller.user_id)
            .await?
            .into_iter()
            .filter(|order| order.seller_id == caller.user_id)
            .collect();

        summarize(caller.user_id, &sold)
    }

    async fn transition(&self, order_id: Uuid, command: OrderCommand) -> Result<Order, OrderError> {
        let order = self.load(order_id).await?;
        self.apply(&order, command).await
    }

    /// Decide the event on the loaded snapshot, then persist it with a
    /// conditional write. A rejected write means another request changed the
    /// status in between; report against what is stored now.
    async fn apply(&self, order: &Order, command: OrderCommand) -> Result<Order, OrderError> {
        let event = order.handle_command(&command, Utc::now())?;
        let Some(change) = event.status_change() else {
            return Ok(order.clone());
        };

        match self.store.change_status(order.id, &change).await? {
            ChangeOutcome::Applied(updated) => {
                self.metrics.record_transition(order.status.as_str(), updated.status.as_str());
                tracing::info!(
                    order_id = %updated.id,
                    from = %order.status,
                    to = %updated.status,
                    event_type = event.event_type(),
                    "✅ Order status changed"
                );
                Ok(updated)
            }
            ChangeOutcome::Rejected(current) => {
                tracing::warn!(
                    order_id = %order.id,
                    observed = %order.status,
                    current = %current.status,
                    "Conditional status update lost a race"
                );
                Err(match command {
                    OrderCommand::Cancel { .. } => OrderError::InvalidState(current.status),
                    OrderCommand::Advance { to, .. } => OrderError::InvalidTransition {
                        from: current.status,
                        to,
                    },
                })
            }
            ChangeOutcome::Missing => Err(OrderError::NotFound(order.id)),
        }
    }

    async fn observe<T, F>(
        &self,
        operation: &'static str,
        subject: Uuid,
        operation_future: F,
    ) -> Result<T, OrderError>
    where
        F: Future<Output = Result<T, OrderError>>,
    {
        let started = Instant::now();
        let result = operation_future.await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(_) => {
                self.metrics.record_operation(operation, "ok", elapsed);
                tracing::debug!(operation, subject = %subject, "Order operation succeeded");
            }
            Err(OrderError::Store(e)) => {
                self.metrics.record_operation(operation, "store", elapsed);
                tracing::error!(operation, subject = %subject, error = %e, "Order store failure");
            }
            Err(e) => {
                self.metrics.record_operation(operation, e.kind(), elapsed);
                tracing::info!(operation, subject = %subject, error = %e, "Order operation refused");
            }
        }
        result
    }
}

fn summarize(seller_id: Uuid, orders: &[Order]) -> Result<SellerSummary, OrderError> {
    let mut by_status: BTreeMap<OrderStatus, u64> = BTreeMap::new();
    let mut gross_cents: i64 = 0;

    for order in orders {
        *by_status.entry(order.status).or_default() += 1;
        if order.status != OrderStatus::Cancelled {
            gross_cents = gross_cents.saturating_add(order.total.cents());
        }
    }

    Ok(SellerSummary {
        seller_id,
        order_count: orders.len() as u64,
        cancelled_count: by_status.get(&OrderStatus::Cancelled).copied().unwrap_or(0),
        by_status,
        gross_revenue: Money::from_cents(gross_cents)?,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
