//! Product management handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde_json::{Value, json};
use tracing::instrument;

use signal_living_core::{ActivityAction, ProductId};

use super::not_found_as;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{ClientIp, RequireAdminAuth};
use crate::models::{Product, ProductFilter, ProductRequest};
use crate::services::Actor;
use crate::state::AppState;

/// Build the admin products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/products", get(index).post(create))
        .route("/api/admin/products/{id}", put(update).delete(destroy))
}

/// GET /api/admin/products
///
/// Every product regardless of status, newest first.
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.repos().products.list(ProductFilter::default()).await?;
    Ok(Json(products))
}

/// POST /api/admin/products
#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let draft = body.validate()?;
    let product = state.repos().products.create(draft).await?;

    state
        .audit()
        .record(
            &Actor::admin(&admin, ip.0),
            ActivityAction::CreateProduct,
            Some(product.name.clone()),
            json!({ "productId": product.id }),
        )
        .await;
    tracing::info!(product_id = %product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product created",
            "product": product,
        })),
    ))
}

/// PUT /api/admin/products/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<Json<Value>, AppError> {
    let draft = body.validate()?;
    let product = state
        .repos()
        .products
        .update(id, draft)
        .await
        .map_err(not_found_as("Product"))?;

    state
        .audit()
        .record(
            &Actor::admin(&admin, ip.0),
            ActivityAction::UpdateProduct,
            Some(product.name.clone()),
            json!({ "productId": product.id }),
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "message": "Product updated",
        "product": product,
    })))
}

/// DELETE /api/admin/products/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
async fn destroy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Value>, AppError> {
    let product = state
        .repos()
        .products
        .delete(id)
        .await
        .map_err(not_found_as("Product"))?;

    state
        .audit()
        .record(
            &Actor::admin(&admin, ip.0),
            ActivityAction::DeleteProduct,
            Some(product.name.clone()),
            json!({ "productId": product.id }),
        )
        .await;
    tracing::info!(product_id = %product.id, "Product deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted",
        "product": product,
    })))
}
