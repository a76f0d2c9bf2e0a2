// ============================================================================
// HTTP Surface (actix-web)
// ============================================================================
//
// Thin transport over `OrderLifecycleManager`: extract the bearer caller,
// call one manager operation, render the result or the error.
//
// ============================================================================

mod auth;
mod error;
mod handlers;
mod routes;

use std::sync::Arc;

use crate::domain::order::OrderLifecycleManager;
use crate::metrics::Metrics;

pub use auth::AuthenticatedCaller;
pub use error::ApiError;
pub use routes::configure_app_routes;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<OrderLifecycleManager>,
    pub metrics: Arc<Metrics>,
}
