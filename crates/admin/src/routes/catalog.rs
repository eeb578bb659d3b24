//! Public catalog reads. No session required.

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;

use signal_living_core::{ProductCategory, ProductId};

use crate::error::AppError;
use crate::extract::{ApiPath, ApiQuery};
use crate::models::{Product, ProductFilter};
use crate::state::AppState;

/// Category value meaning "no filter".
const ALL_CATEGORIES: &str = "all";

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(index))
        .route("/api/products/{id}", get(show))
        .route("/api/products/category/{category}", get(by_category))
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

fn parse_category(value: &str) -> Result<ProductCategory, AppError> {
    value.parse().map_err(AppError::Validation)
}

/// GET /api/products?category=
async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
        .map(parse_category)
        .transpose()?;

    let products = state
        .repos()
        .products
        .list(ProductFilter::on_sale(category))
        .await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>, AppError> {
    state
        .repos()
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// GET /api/products/category/{category}
async fn by_category(
    State(state): State<AppState>,
    ApiPath(category): ApiPath<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let category = parse_category(&category)?;
    let products = state
        .repos()
        .products
        .list(ProductFilter::on_sale(Some(category)))
        .await?;
    Ok(Json(products))
}
