use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::{OrderCommand, PlaceOrder};
use super::errors::OrderError;
use super::events::*;
use super::value_objects::{Money, OrderStatus};
use crate::identity::{Caller, Role};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Identity
    pub id: Uuid,

    // Participants
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub artwork_id: Uuid,

    pub status: OrderStatus,

    // Amounts, fixed at checkout
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Validate a checkout request and build the new order with its
    /// `Placed` event.
    pub fn place(
        order_id: Uuid,
        buyer: &Caller,
        request: &PlaceOrder,
        at: DateTime<Utc>,
    ) -> Result<(Self, OrderEvent), OrderError> {
        if buyer.user_id == request.seller_id {
            return Err(OrderError::SelfPurchase);
        }
        Self::validate_totals(request)?;

        let status = if request.payment_captured {
            OrderStatus::Confirmed
        } else {
            OrderStatus::Pending
        };

        let order = Self {
            id: order_id,
            buyer_id: buyer.user_id,
            seller_id: request.seller_id,
            artwork_id: request.artwork_id,
            status,
            subtotal: request.subtotal,
            tax: request.tax,
            shipping: request.shipping,
            total: request.total,
            created_at: at,
            updated_at: at,
            cancelled_at: None,
        };

        let event = OrderEvent::Placed(OrderPlaced {
            order_id,
            buyer_id: order.buyer_id,
            seller_id: order.seller_id,
            artwork_id: order.artwork_id,
            status,
            total: order.total,
            at,
        });

        Ok((order, event))
    }

    fn validate_totals(request: &PlaceOrder) -> Result<(), OrderError> {
        let expected = request
            .subtotal
            .checked_add(request.tax)
            .and_then(|sum| sum.checked_add(request.shipping));

        if expected != Some(request.total) {
            return Err(OrderError::InvalidTotals {
                subtotal: request.subtotal,
                tax: request.tax,
                shipping: request.shipping,
                total: request.total,
            });
        }
        Ok(())
    }

    /// Buyer or seller of this order.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    /// Decide the event for a command without touching state.
    pub fn handle_command(
        &self,
        command: &OrderCommand,
        at: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        match command {
            OrderCommand::Cancel { requested_by } => {
                if requested_by.user_id != self.buyer_id {
                    return Err(OrderError::Forbidden(
                        "caller does not own this order".to_string(),
                    ));
                }
                if !self.status.is_cancellable() {
                    return Err(OrderError::InvalidState(self.status));
                }

                Ok(OrderEvent::Cancelled(OrderCancelled {
                    order_id: self.id,
                    from: self.status,
                    cancelled_by: requested_by.user_id,
                    at,
                }))
            }

            OrderCommand::Advance { to, requested_by } => {
                let may_fulfil =
                    requested_by.user_id == self.seller_id || requested_by.role == Role::Admin;
                if !may_fulfil {
                    return Err(OrderError::Forbidden(
                        "only the seller can fulfil this order".to_string(),
                    ));
                }
                if self.status.next() != Some(*to) {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to: *to,
                    });
                }

                Ok(OrderEvent::Advanced(OrderAdvanced {
                    order_id: self.id,
                    from: self.status,
                    to: *to,
                    advanced_by: requested_by.user_id,
                    at,
                }))
            }
        }
    }

    /// Write the new status and timestamps. Callers check `permits` first.
    pub fn apply_status_change(&mut self, change: &StatusChange) {
        self.status = change.to;
        self.updated_at = change.at;
        if let Some(cancelled_at) = change.cancelled_at() {
            self.cancelled_at = Some(cancelled_at);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
