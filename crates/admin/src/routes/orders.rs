//! Order handlers.
//!
//! Status changes are unrestricted: any status may follow any other. The
//! audit entry records both ends of the change.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use signal_living_core::{ActivityAction, OrderId, OrderStatus};

use super::not_found_as;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{ClientIp, RequireAdminAuth};
use crate::models::Order;
use crate::services::Actor;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/orders", get(index))
        .route("/api/admin/orders/{id}", get(show))
        .route("/api/admin/orders/{id}/status", patch(update_status))
}

/// Body of `PATCH /api/admin/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// GET /api/admin/orders
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.repos().orders.list().await?))
}

/// GET /api/admin/orders/{id}
#[instrument(skip_all, fields(order_id = %id))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>, AppError> {
    state
        .repos()
        .orders
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Order"))
}

/// PATCH /api/admin/orders/{id}/status
#[instrument(skip_all, fields(admin_id = %admin.id, order_id = %id))]
async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<Value>, AppError> {
    let (order, previous) = state
        .repos()
        .orders
        .update_status(id, body.status)
        .await
        .map_err(not_found_as("Order"))?;

    state
        .audit()
        .record(
            &Actor::admin(&admin, ip.0),
            ActivityAction::UpdateOrder,
            Some(order.order_number.clone()),
            json!({ "orderId": order.id, "from": previous, "to": order.status }),
        )
        .await;
    tracing::info!(from = %previous, to = %order.status, "Order status changed");

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated",
        "order": order,
    })))
}
