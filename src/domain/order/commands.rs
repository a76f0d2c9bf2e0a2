use serde::Deserialize;
use uuid::Uuid;

use super::value_objects::{Money, OrderStatus};
use crate::identity::Caller;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Checkout request for a single artwork.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub artwork_id: Uuid,
    pub seller_id: Uuid,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    /// Checkout captured payment up front; the order starts confirmed.
    #[serde(default)]
    pub payment_captured: bool,
}

/// Commands against an existing order.
#[derive(Debug, Clone)]
pub enum OrderCommand {
    Advance { to: OrderStatus, requested_by: Caller },
    Cancel { requested_by: Caller },
}
