use actix_web::web;

use super::handlers::*;
use super::ApiError;
use crate::metrics::{health_handler, metrics_handler};

/// Register every route on an actix `App`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies get the same JSON error shape as domain failures.
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

    cfg.app_data(json_config)
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/orders")
                        .route("", web::post().to(place_order_handler))
                        .route("", web::get().to(list_orders_handler))
                        .route("/{order_id}", web::get().to(get_order_handler))
                        .route("/{order_id}/cancel", web::put().to(cancel_order_handler))
                        .route("/{order_id}/status", web::put().to(advance_order_handler)),
                )
                .service(
                    web::scope("/sellers")
                        .route("/me/summary", web::get().to(seller_summary_handler)),
                ),
        );
}
