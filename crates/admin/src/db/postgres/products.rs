//! Catalog repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use signal_living_core::{Price, ProductCategory, ProductId, ProductStatus};

use super::to_count;
use crate::db::{ProductStore, RepositoryError};
use crate::models::{Product, ProductDraft, ProductFilter};

const COLUMNS: &str = "id, name, category, price, stock, status, description, image_url, \
                       is_new_product, is_best, discount, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    category: ProductCategory,
    price: Decimal,
    stock: i32,
    status: ProductStatus,
    description: String,
    image_url: String,
    is_new_product: bool,
    is_best: bool,
    discount: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str| {
            RepositoryError::DataCorruption(format!("invalid {field} for product {}", row.id))
        };

        Ok(Self {
            id: ProductId::new(row.id),
            price: Price::new(row.price).map_err(|_| corrupt("price"))?,
            stock: u32::try_from(row.stock).map_err(|_| corrupt("stock"))?,
            discount: u8::try_from(row.discount).map_err(|_| corrupt("discount"))?,
            name: row.name,
            category: row.category,
            status: row.status,
            description: row.description,
            image_url: row.image_url,
            is_new_product: row.is_new_product,
            is_best: row.is_best,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Stock as stored (`INTEGER`); drafts are validated to fit.
fn stock_column(stock: u32) -> i32 {
    i32::try_from(stock).unwrap_or(i32::MAX)
}

/// Products in `admin.product`.
pub struct PgProducts {
    pool: PgPool,
}

impl PgProducts {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProducts {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM admin.product WHERE TRUE"));
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM admin.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO admin.product
                 (name, category, price, stock, status, description, image_url,
                  is_new_product, is_best, discount)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(draft.category)
        .bind(draft.price)
        .bind(stock_column(draft.stock))
        .bind(draft.status)
        .bind(&draft.description)
        .bind(&draft.image_url)
        .bind(draft.is_new_product)
        .bind(draft.is_best)
        .bind(i16::from(draft.discount))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE admin.product
             SET name = $2, category = $3, price = $4, stock = $5, status = $6,
                 description = $7, image_url = $8, is_new_product = $9, is_best = $10,
                 discount = $11, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(draft.category)
        .bind(draft.price)
        .bind(stock_column(draft.stock))
        .bind(draft.status)
        .bind(&draft.description)
        .bind(&draft.image_url)
        .bind(draft.is_new_product)
        .bind(draft.is_best)
        .bind(i16::from(draft.discount))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM admin.product WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin.product")
            .fetch_one(&self.pool)
            .await?;
        to_count(count)
    }
}
