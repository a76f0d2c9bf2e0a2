// ============================================================================
// Order Domain - Business Logic for the Order aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, Money)
// - Events (OrderPlaced, OrderAdvanced, OrderCancelled)
// - Commands (PlaceOrder, OrderCommand)
// - Errors (OrderError enum)
// - Aggregate (Order with its transition rules)
// - Lifecycle manager (OrderLifecycleManager)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod lifecycle;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use lifecycle::*;
