use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::value::{CqlValue, Row};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{ChangeOutcome, OrderStore, StoreError};
use crate::domain::order::{Money, Order, OrderStatus, StatusChange};

// ============================================================================
// ScyllaDB Order Store
// ============================================================================
//
// One row per order keyed by id. Status changes use a lightweight
// transaction (`IF status IN ?`), which closes the race between two
// concurrent cancellations of the same order.
//
// ============================================================================

const ORDER_COLUMNS: &str = "id, buyer_id, seller_id, artwork_id, status, \
     subtotal_cents, tax_cents, shipping_cents, total_cents, \
     created_at, updated_at, cancelled_at";

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS orders (
        id uuid PRIMARY KEY,
        buyer_id uuid,
        seller_id uuid,
        artwork_id uuid,
        status text,
        subtotal_cents bigint,
        tax_cents bigint,
        shipping_cents bigint,
        total_cents bigint,
        created_at timestamp,
        updated_at timestamp,
        cancelled_at timestamp
    )",
    "CREATE INDEX IF NOT EXISTS orders_by_buyer ON orders (buyer_id)",
    "CREATE INDEX IF NOT EXISTS orders_by_seller ON orders (seller_id)",
];

type OrderRow = (
    Uuid,
    Uuid,
    Uuid,
    Uuid,
    String,
    i64,
    i64,
    i64,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

pub struct ScyllaOrderStore {
    session: Arc<Session>,
}

impl ScyllaOrderStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Connect, create the keyspace and schema if needed, and switch to it.
    pub async fn connect(nodes: &[String], keyspace: &str) -> Result<Self, StoreError> {
        tracing::info!(nodes = ?nodes, keyspace = %keyspace, "Connecting to ScyllaDB...");

        let session: Session = SessionBuilder::new()
            .known_nodes(nodes)
            .build()
            .await
            .map_err(StoreError::database)?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
                ),
                &[],
            )
            .await
            .map_err(StoreError::database)?;

        session
            .use_keyspace(keyspace, false)
            .await
            .map_err(StoreError::database)?;

        for statement in SCHEMA {
            session
                .query_unpaged(statement, &[])
                .await
                .map_err(StoreError::database)?;
        }

        tracing::info!(keyspace = %keyspace, "ScyllaDB schema ready");
        Ok(Self::new(Arc::new(session)))
    }

    async fn select_where(&self, clause: &str, key: Uuid) -> Result<Vec<Order>, StoreError> {
        let result = self
            .session
            .query_unpaged(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE {clause} = ?"), (key,))
            .await
            .map_err(StoreError::database)?;

        let rows_result = result.into_rows_result().map_err(StoreError::database)?;

        let mut orders = Vec::new();
        for row in rows_result.rows::<OrderRow>().map_err(StoreError::database)? {
            orders.push(order_from_row(row.map_err(StoreError::database)?)?);
        }
        Ok(orders)
    }
}

fn order_from_row(row: OrderRow) -> Result<Order, StoreError> {
    let (
        id,
        buyer_id,
        seller_id,
        artwork_id,
        status,
        subtotal,
        tax,
        shipping,
        total,
        created_at,
        updated_at,
        cancelled_at,
    ) = row;

    let corrupt = |reason: String| StoreError::Corrupt { id, reason };
    let money = |cents: i64| Money::from_cents(cents).map_err(|e| corrupt(e.to_string()));

    Ok(Order {
        id,
        buyer_id,
        seller_id,
        artwork_id,
        status: status.parse::<OrderStatus>().map_err(|e| corrupt(e.to_string()))?,
        subtotal: money(subtotal)?,
        tax: money(tax)?,
        shipping: money(shipping)?,
        total: money(total)?,
        created_at,
        updated_at,
        cancelled_at,
    })
}

/// Read the `[applied]` column of a lightweight transaction result.
fn applied_flag(row: Option<Row>) -> Result<bool, StoreError> {
    match row.and_then(|row| row.columns.into_iter().next().flatten()) {
        Some(CqlValue::Boolean(applied)) => Ok(applied),
        other => Err(StoreError::Database(format!(
            "conditional write returned no [applied] flag: {other:?}"
        ))),
    }
}

#[async_trait]
impl OrderStore for ScyllaOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let result = self
            .session
            .query_unpaged(
                format!(
                    "INSERT INTO orders ({ORDER_COLUMNS}) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) IF NOT EXISTS"
                ),
                (
                    order.id,
                    order.buyer_id,
                    order.seller_id,
                    order.artwork_id,
                    order.status.as_str(),
                    order.subtotal.cents(),
                    order.tax.cents(),
                    order.shipping.cents(),
                    order.total.cents(),
                    order.created_at,
                    order.updated_at,
                    order.cancelled_at,
                ),
            )
            .await
            .map_err(StoreError::database)?;

        let rows_result = result.into_rows_result().map_err(StoreError::database)?;
        let applied = applied_flag(rows_result.maybe_first_row::<Row>().map_err(StoreError::database)?)?;
        if !applied {
            return Err(StoreError::Duplicate(order.id));
        }

        tracing::debug!(order_id = %order.id, "Inserted order row");
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.select_where("id", id).await?.into_iter().next())
    }

    async fn change_status(&self, id: Uuid, change: &StatusChange) -> Result<ChangeOutcome, StoreError> {
        let expected: Vec<&str> = change.expected.iter().map(OrderStatus::as_str).collect();

        let result = self
            .session
            .query_unpaged(
                "UPDATE orders SET status = ?, updated_at = ?, cancelled_at = ? \
                 WHERE id = ? IF status IN ?",
                (change.to.as_str(), change.at, change.cancelled_at(), id, expected),
            )
            .await
            .map_err(StoreError::database)?;

        let rows_result = result.into_rows_result().map_err(StoreError::database)?;
        let applied = applied_flag(rows_result.maybe_first_row::<Row>().map_err(StoreError::database)?)?;

        tracing::debug!(
            order_id = %id,
            to = %change.to,
            applied = applied,
            "Conditional status update"
        );

        // Re-read so callers get the row as it now stands.
        match (applied, self.fetch(id).await?) {
            (_, None) => Ok(ChangeOutcome::Missing),
            (true, Some(order)) => Ok(ChangeOutcome::Applied(order)),
            (false, Some(order)) => Ok(ChangeOutcome::Rejected(order)),
        }
    }

    async fn list_for_participant(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut by_id: HashMap<Uuid, Order> = HashMap::new();
        for column in ["buyer_id", "seller_id"] {
            for order in self.select_where(column, user_id).await? {
                by_id.insert(order.id, order);
            }
        }
        Ok(by_id.into_values().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.session
            .query_unpaged("SELECT now() FROM system.local", &[])
            .await
            .map_err(StoreError::database)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "scylla"
    }
}
