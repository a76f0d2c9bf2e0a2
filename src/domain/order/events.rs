use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{Money, OrderStatus};

// ============================================================================
// Order Events - facts emitted by the Order aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Placed(OrderPlaced),
    Advanced(OrderAdvanced),
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => "OrderPlaced",
            OrderEvent::Advanced(_) => "OrderAdvanced",
            OrderEvent::Cancelled(_) => "OrderCancelled",
        }
    }

    /// Conditional status write needed to persist this event.
    ///
    /// `Placed` creates a record instead of changing one, so it has none.
    pub fn status_change(&self) -> Option<StatusChange> {
        match self {
            OrderEvent::Placed(_) => None,
            OrderEvent::Advanced(e) => Some(StatusChange {
                expected: vec![e.from],
                to: e.to,
                at: e.at,
            }),
            OrderEvent::Cancelled(e) => Some(StatusChange {
                expected: OrderStatus::CANCELLABLE.to_vec(),
                to: OrderStatus::Cancelled,
                at: e.at,
            }),
        }
    }
}

/// Order placed by the checkout flow.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlaced {
    pub order_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub artwork_id: Uuid,
    pub status: OrderStatus,
    pub total: Money,
    pub at: DateTime<Utc>,
}

/// One step along the fulfilment path.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAdvanced {
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub advanced_by: Uuid,
    pub at: DateTime<Utc>,
}

/// Buyer cancelled the order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCancelled {
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub cancelled_by: Uuid,
    pub at: DateTime<Utc>,
}

/// Compare-and-set on the status column: write `to` only while the stored
/// status is one of `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub expected: Vec<OrderStatus>,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn permits(&self, current: OrderStatus) -> bool {
        self.expected.contains(&current)
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        (self.to == OrderStatus::Cancelled).then_some(self.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_change_expects_cancellable_set() {
        let at = Utc::now();
        let event = OrderEvent::Cancelled(OrderCancelled {
            order_id: Uuid::new_v4(),
            from: OrderStatus::Processing,
            cancelled_by: Uuid::new_v4(),
            at,
        });

        let change = event.status_change().unwrap();
        assert_eq!(change.to, OrderStatus::Cancelled);
        assert!(change.permits(OrderStatus::Confirmed));
        assert!(change.permits(OrderStatus::Processing));
        assert!(!change.permits(OrderStatus::Cancelled));
        assert_eq!(change.cancelled_at(), Some(at));
    }

    #[test]
    fn test_advance_change_expects_exact_predecessor() {
        let event = OrderEvent::Advanced(OrderAdvanced {
            order_id: Uuid::new_v4(),
            from: OrderStatus::Processing,
            to: OrderStatus::Shipped,
            advanced_by: Uuid::new_v4(),
            at: Utc::now(),
        });

        let change = event.status_change().unwrap();
        assert_eq!(change.expected, vec![OrderStatus::Processing]);
        assert_eq!(change.cancelled_at(), None);
    }
}
