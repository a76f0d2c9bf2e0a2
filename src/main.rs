use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use artmarket_orders::config::{AppConfig, StoreBackend};
use artmarket_orders::domain::order::OrderLifecycleManager;
use artmarket_orders::identity::{IdentityResolver, StaticTokenResolver};
use artmarket_orders::metrics::Metrics;
use artmarket_orders::store::{InMemoryOrderStore, OrderStore, ScyllaOrderStore};
use artmarket_orders::utils::{retry_with_backoff, RetryConfig};
use artmarket_orders::web::{configure_app_routes, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging; override with RUST_LOG, e.g. RUST_LOG=debug
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,artmarket_orders=debug")),
        )
        .init();

    tracing::info!("🚀 Starting art marketplace order service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;

    // === 2. Order store ===
    let store: Arc<dyn OrderStore> = match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; orders are lost on restart");
            Arc::new(InMemoryOrderStore::new())
        }
        StoreBackend::Scylla => {
            let store = retry_with_backoff(&RetryConfig::startup(), "scylla_connect", |_attempt| {
                ScyllaOrderStore::connect(&config.scylla_nodes, &config.scylla_keyspace)
            })
            .await?;
            Arc::new(store)
        }
    };

    // === 3. Identity ===
    let identity: Arc<dyn IdentityResolver> = match &config.auth_tokens_file {
        Some(path) => Arc::new(StaticTokenResolver::from_file(path)?),
        None => {
            tracing::warn!("AUTH_TOKENS_FILE not set; every request will be rejected as unauthenticated");
            Arc::new(StaticTokenResolver::new())
        }
    };

    // === 4. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 5. Lifecycle manager + HTTP ===
    let manager = Arc::new(OrderLifecycleManager::new(store, identity, metrics.clone()));
    let state = AppState { manager, metrics };

    let bind_address = config.bind_address();
    tracing::info!("Listening on http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure_app_routes)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    tracing::info!("👋 Order service stopped");
    Ok(())
}
