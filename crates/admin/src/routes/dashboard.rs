//! Dashboard statistics.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use signal_living_core::Price;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/stats", get(stats))
}

/// Store-wide counters shown on the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_products: u64,
    /// Sum of non-canceled order amounts.
    pub total_revenue: Price,
    /// Orders still in `order-confirmed`.
    pub new_orders: u64,
}

/// GET /api/admin/stats
#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn stats(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let repos = state.repos();
    let (orders, total_products) = tokio::try_join!(repos.orders.summary(), repos.products.count())?;

    Ok(Json(DashboardStats {
        total_orders: orders.total_orders,
        total_products,
        total_revenue: orders.total_revenue,
        new_orders: orders.new_orders,
    }))
}
