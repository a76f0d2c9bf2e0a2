// Shared fixtures for the integration suites.
#![allow(dead_code)]

use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;
use uuid::Uuid;

use artmarket_orders::domain::order::{Money, Order, OrderLifecycleManager, OrderStatus, PlaceOrder};
use artmarket_orders::identity::{Caller, Role, StaticTokenResolver};
use artmarket_orders::metrics::Metrics;
use artmarket_orders::store::{InMemoryOrderStore, OrderStore};
use artmarket_orders::web::AppState;

pub const BUYER_TOKEN: &str = "buyer-token";
pub const OTHER_BUYER_TOKEN: &str = "other-buyer-token";
pub const SELLER_TOKEN: &str = "seller-token";
pub const ADMIN_TOKEN: &str = "admin-token";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
});

pub fn setup_tracing() {
    Lazy::force(&TRACING_INIT);
}

pub struct Marketplace {
    pub manager: Arc<OrderLifecycleManager>,
    pub store: Arc<InMemoryOrderStore>,
    pub metrics: Arc<Metrics>,
    pub buyer: Caller,
    pub other_buyer: Caller,
    pub seller: Caller,
    pub admin: Caller,
}

impl Marketplace {
    pub fn new() -> Self {
        setup_tracing();

        let buyer = Caller::new(Uuid::new_v4(), Role::Buyer);
        let other_buyer = Caller::new(Uuid::new_v4(), Role::Buyer);
        let seller = Caller::new(Uuid::new_v4(), Role::Seller);
        let admin = Caller::new(Uuid::new_v4(), Role::Admin);

        let identity = StaticTokenResolver::new()
            .with_token(BUYER_TOKEN, buyer)
            .with_token(OTHER_BUYER_TOKEN, other_buyer)
            .with_token(SELLER_TOKEN, seller)
            .with_token(ADMIN_TOKEN, admin);

        let store = Arc::new(InMemoryOrderStore::new());
        let metrics = Arc::new(Metrics::new().expect("metrics registry"));
        let manager = Arc::new(OrderLifecycleManager::new(
            store.clone(),
            Arc::new(identity),
            metrics.clone(),
        ));

        Self { manager, store, metrics, buyer, other_buyer, seller, admin }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            manager: self.manager.clone(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn checkout(&self) -> PlaceOrder {
        PlaceOrder {
            artwork_id: Uuid::new_v4(),
            seller_id: self.seller.user_id,
            subtotal: Money::from_cents(120_000).unwrap(),
            tax: Money::from_cents(9_600).unwrap(),
            shipping: Money::from_cents(2_500).unwrap(),
            total: Money::from_cents(132_100).unwrap(),
            payment_captured: true,
        }
    }

    /// Insert an order for `buyer` already sitting in `status`.
    pub async fn seed(&self, status: OrderStatus) -> Order {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            buyer_id: self.buyer.user_id,
            seller_id: self.seller.user_id,
            artwork_id: Uuid::new_v4(),
            status,
            subtotal: Money::from_cents(40_000).unwrap(),
            tax: Money::from_cents(3_200).unwrap(),
            shipping: Money::from_cents(1_800).unwrap(),
            total: Money::from_cents(45_000).unwrap(),
            created_at: now,
            updated_at: now,
            cancelled_at: if status == OrderStatus::Cancelled { Some(now) } else { None },
        };
        self.store.insert(&order).await.expect("seed order");
        order
    }

    pub async fn stored(&self, id: Uuid) -> Order {
        self.store.fetch(id).await.unwrap().expect("order exists")
    }
}
