// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with value objects, events,
// commands, errors, the aggregate itself, and the service that drives it.
// Storage and transport live outside this layer.
//
// ============================================================================

pub mod order;
