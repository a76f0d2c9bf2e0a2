use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use super::{ApiError, AppState, AuthenticatedCaller};
use crate::domain::order::{OrderStatus, PlaceOrder};

#[derive(Debug, Deserialize)]
pub struct AdvanceOrderPayload {
    pub status: OrderStatus,
}

fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("'{raw}' is not a valid order id")))
}

#[instrument(
    name = "handler::cancel_order",
    skip_all,
    fields(order_id = %path.as_str(), user_id = %caller.0.user_id)
)]
pub async fn cancel_order_handler(
    state: web::Data<AppState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = state.manager.cancel_order(order_id, &caller.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}

#[instrument(
    name = "handler::get_order",
    skip_all,
    fields(order_id = %path.as_str(), user_id = %caller.0.user_id)
)]
pub async fn get_order_handler(
    state: web::Data<AppState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = state.manager.get_order(order_id, &caller.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}

#[instrument(
    name = "handler::place_order",
    skip_all,
    fields(user_id = %caller.0.user_id, artwork_id = %payload.artwork_id)
)]
pub async fn place_order_handler(
    state: web::Data<AppState>,
    caller: AuthenticatedCaller,
    payload: web::Json<PlaceOrder>,
) -> Result<HttpResponse, ApiError> {
    let order = state.manager.place_order(&caller.0, &payload).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "order": order })))
}

#[instrument(name = "handler::list_orders", skip_all, fields(user_id = %caller.0.user_id))]
pub async fn list_orders_handler(
    state: web::Data<AppState>,
    caller: AuthenticatedCaller,
) -> Result<HttpResponse, ApiError> {
    let orders = state.manager.list_orders(&caller.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(
    name = "handler::advance_order",
    skip_all,
    fields(order_id = %path.as_str(), user_id = %caller.0.user_id, to = %payload.status)
)]
pub async fn advance_order_handler(
    state: web::Data<AppState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<AdvanceOrderPayload>,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_order_id(&path)?;
    let order = state
        .manager
        .advance_order(order_id, &caller.0, payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}

#[instrument(name = "handler::seller_summary", skip_all, fields(user_id = %caller.0.user_id))]
pub async fn seller_summary_handler(
    state: web::Data<AppState>,
    caller: AuthenticatedCaller,
) -> Result<HttpResponse, ApiError> {
    let summary = state.manager.seller_summary(&caller.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "summary": summary })))
}
