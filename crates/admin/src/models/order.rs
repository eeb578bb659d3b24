//! Customer order types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use signal_living_core::{OrderId, OrderStatus, Price, ProductId};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Human-facing unique number, e.g. `ORD-2024-001`.
    pub order_number: String,
    pub customer: String,
    pub amount: Price,
    pub status: OrderStatus,
    /// Order date (calendar day, `YYYY-MM-DD`).
    pub date: NaiveDate,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item; stored as JSON alongside the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

/// Insert payload for an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer: String,
    pub amount: Price,
    pub status: OrderStatus,
    pub date: NaiveDate,
    pub items: Vec<OrderItem>,
}

/// Aggregates for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderSummary {
    pub total_orders: u64,
    /// Sum of amounts over orders that are not canceled.
    pub total_revenue: Price,
    /// Orders still in `order-confirmed`.
    pub new_orders: u64,
}

impl OrderSummary {
    /// Compute the summary over a set of orders.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut acc, order| {
            acc.total_orders += 1;
            if order.status != OrderStatus::Canceled {
                acc.total_revenue += order.amount;
            }
            if order.status == OrderStatus::OrderConfirmed {
                acc.new_orders += 1;
            }
            acc
        })
    }
}
