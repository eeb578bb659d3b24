//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use signal_living_core::{OrderId, OrderStatus, Price};

use super::{conflict_or_database, to_count};
use crate::db::{OrderStore, RepositoryError};
use crate::models::{NewOrder, Order, OrderItem, OrderSummary};

const COLUMNS: &str =
    "id, order_number, customer, amount, status, order_date, items, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    customer: String,
    amount: Decimal,
    status: OrderStatus,
    order_date: NaiveDate,
    items: Json<Vec<OrderItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let amount = Price::new(row.amount).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative amount for order {}", row.id))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer: row.customer,
            amount,
            status: row.status,
            date: row.order_date,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row for a status change: the updated order plus what it was before.
#[derive(Debug, sqlx::FromRow)]
struct StatusChangeRow {
    #[sqlx(flatten)]
    order: OrderRow,
    previous_status: OrderStatus,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_orders: i64,
    total_revenue: Decimal,
    new_orders: i64,
}

/// Orders in `admin.customer_order`.
pub struct PgOrders {
    pool: PgPool,
}

impl PgOrders {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrders {
    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM admin.customer_order ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM admin.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO admin.customer_order
                 (order_number, customer, amount, status, order_date, items)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.order_number)
        .bind(&new.customer)
        .bind(new.amount)
        .bind(new.status)
        .bind(new.date)
        .bind(Json(&new.items))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "order number"))?;

        row.try_into()
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(Order, OrderStatus), RepositoryError> {
        let row = sqlx::query_as::<_, StatusChangeRow>(
            "WITH previous AS (
                 SELECT id, status FROM admin.customer_order WHERE id = $1 FOR UPDATE
             )
             UPDATE admin.customer_order o
             SET status = $2, updated_at = now()
             FROM previous
             WHERE o.id = previous.id
             RETURNING o.id, o.order_number, o.customer, o.amount, o.status, o.order_date,
                       o.items, o.created_at, o.updated_at, previous.status AS previous_status",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok((row.order.try_into()?, row.previous_status))
    }

    async fn summary(&self) -> Result<OrderSummary, RepositoryError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            "SELECT COUNT(*) AS total_orders,
                    COALESCE(SUM(amount) FILTER (WHERE status <> 'canceled'), 0) AS total_revenue,
                    COUNT(*) FILTER (WHERE status = 'order-confirmed') AS new_orders
             FROM admin.customer_order",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderSummary {
            total_orders: to_count(row.total_orders)?,
            total_revenue: Price::new(row.total_revenue).map_err(|_| {
                RepositoryError::DataCorruption("negative order revenue".to_owned())
            })?,
            new_orders: to_count(row.new_orders)?,
        })
    }
}
