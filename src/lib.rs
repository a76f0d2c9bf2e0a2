//! Order service for the art marketplace: order placement, buyer
//! cancellation, seller fulfilment and dashboards over a pluggable store.

pub mod config;
pub mod domain;
pub mod identity;
pub mod metrics;
pub mod store;
pub mod utils;
pub mod web;
