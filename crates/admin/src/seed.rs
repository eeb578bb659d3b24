//! Bootstrap data: the first super admin and an optional sample catalog.
//!
//! Every step is idempotent: accounts are created only when none exist,
//! products only when the catalog is empty, orders only when there are none.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use signal_living_core::{
    AdminRole, OrderStatus, Price, ProductCategory, ProductStatus, Username, UsernameError,
};

use crate::config::AdminConfig;
use crate::db::{Repositories, RepositoryError};
use crate::models::{NewAdminUser, NewOrder, OrderItem, Product, ProductDraft};
use crate::services::password::{PasswordError, PasswordHasher};

/// Errors while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid bootstrap admin username: {0}")]
    Username(#[from] UsernameError),

    #[error("invalid bootstrap admin password: {0}")]
    Password(#[from] PasswordError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What a seed run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub products: usize,
    pub orders: usize,
}

/// Seed the store according to `config`.
///
/// # Errors
///
/// Returns `SeedError` if the bootstrap credentials are invalid or the
/// store fails.
pub async fn run(
    repos: &Repositories,
    hasher: &PasswordHasher,
    config: &AdminConfig,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport {
        admin_created: bootstrap_admin(repos, hasher, config).await?,
        ..SeedReport::default()
    };

    if config.seed_catalog {
        let products = if repos.products.count().await? == 0 {
            let created = sample_products(repos).await?;
            report.products = created.len();
            created
        } else {
            Vec::new()
        };

        if repos.orders.summary().await?.total_orders == 0 {
            report.orders = sample_orders(repos, &products).await?;
        }
    }

    tracing::info!(
        admin_created = report.admin_created,
        products = report.products,
        orders = report.orders,
        "Seed complete"
    );
    Ok(report)
}

/// Create the configured super admin if there are no accounts.
async fn bootstrap_admin(
    repos: &Repositories,
    hasher: &PasswordHasher,
    config: &AdminConfig,
) -> Result<bool, SeedError> {
    if repos.admin_users.count().await? > 0 {
        return Ok(false);
    }

    let bootstrap = &config.bootstrap_admin;
    let username = Username::parse(&bootstrap.username)?;
    let password_hash = hasher.hash(&bootstrap.password)?;
    let user = repos
        .admin_users
        .create(NewAdminUser {
            username,
            password_hash,
            role: AdminRole::SuperAdmin,
        })
        .await?;

    tracing::info!(admin_id = %user.id, username = %user.username, "Default super admin created");
    Ok(true)
}

#[allow(clippy::fn_params_excessive_bools, clippy::too_many_arguments)]
fn product(
    name: &str,
    category: ProductCategory,
    price: u32,
    stock: u32,
    description: &str,
    image: &str,
    is_new_product: bool,
    is_best: bool,
) -> ProductDraft {
    ProductDraft {
        name: name.to_owned(),
        category,
        price: Price::from_units(price),
        stock,
        status: ProductStatus::OnSale,
        description: description.to_owned(),
        image_url: format!("/uploads/products/{image}"),
        is_new_product,
        is_best,
        discount: 0,
    }
}

async fn sample_products(repos: &Repositories) -> Result<Vec<Product>, RepositoryError> {
    let drafts = [
        product(
            "프리미엄 파자마 세트",
            ProductCategory::Pajamas,
            89_000,
            15,
            "고급 면 소재의 편안한 파자마",
            "pajamas1.jpg",
            true,
            false,
        ),
        product(
            "호텔식 슬리퍼",
            ProductCategory::Slippers,
            35_000,
            20,
            "부드러운 호텔식 슬리퍼",
            "slippers1.jpg",
            false,
            true,
        ),
        product(
            "린넨 앞치마",
            ProductCategory::Aprons,
            45_000,
            30,
            "내추럴한 감성의 린넨 앞치마",
            "apron1.jpg",
            false,
            false,
        ),
    ];

    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        created.push(repos.products.create(draft).await?);
    }
    Ok(created)
}

fn item(products: &[Product], name: &str, quantity: u32, price: u32) -> OrderItem {
    OrderItem {
        product_id: products.iter().find(|p| p.name == name).map(|p| p.id),
        name: name.to_owned(),
        quantity,
        price: Price::from_units(price),
    }
}

fn order(
    number: &str,
    customer: &str,
    status: OrderStatus,
    date: NaiveDate,
    items: Vec<OrderItem>,
) -> NewOrder {
    let amount = items
        .iter()
        .filter_map(|i| Price::new(i.price.amount() * Decimal::from(i.quantity)).ok())
        .sum();
    NewOrder {
        order_number: number.to_owned(),
        customer: customer.to_owned(),
        amount,
        status,
        date,
        items,
    }
}

async fn sample_orders(
    repos: &Repositories,
    products: &[Product],
) -> Result<usize, RepositoryError> {
    let day = |d| NaiveDate::from_ymd_opt(2024, 12, d).unwrap_or_default();
    let orders = [
        order(
            "ORD-2024-001",
            "김민수",
            OrderStatus::Shipping,
            day(30),
            vec![item(products, "프리미엄 파자마 세트", 1, 89_000)],
        ),
        order(
            "ORD-2024-002",
            "이지은",
            OrderStatus::Delivered,
            day(29),
            vec![
                item(products, "린넨 앞치마", 2, 45_000),
                item(products, "호텔식 슬리퍼", 1, 35_000),
            ],
        ),
        order(
            "ORD-2024-003",
            "박서준",
            OrderStatus::OrderConfirmed,
            day(30),
            vec![
                item(products, "린넨 앞치마", 1, 45_000),
                item(products, "수면 안대", 1, 22_000),
            ],
        ),
    ];

    let count = orders.len();
    for new in orders {
        repos.orders.create(new).await?;
    }
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::HashingConfig;
    use crate::models::ProductFilter;

    fn setup() -> (Repositories, PasswordHasher, AdminConfig) {
        let config = AdminConfig {
            hashing: HashingConfig::fast(),
            ..AdminConfig::default()
        };
        (
            Repositories::in_memory(100),
            PasswordHasher::new(config.hashing).unwrap(),
            config,
        )
    }

    #[tokio::test]
    async fn test_seed_creates_admin_and_catalog_once() {
        let (repos, hasher, config) = setup();

        let first = run(&repos, &hasher, &config).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                admin_created: true,
                products: 3,
                orders: 3,
            }
        );

        let second = run(&repos, &hasher, &config).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let creds = repos.admin_users.get_credentials("admin").await.unwrap().unwrap();
        assert_eq!(creds.user.role, AdminRole::SuperAdmin);
        assert!(hasher.verify(&SecretString::from("admin12345"), &creds.password_hash));
    }

    #[tokio::test]
    async fn test_sample_order_amounts_match_items() {
        let (repos, hasher, config) = setup();
        run(&repos, &hasher, &config).await.unwrap();

        let orders = repos.orders.list().await.unwrap();
        let amounts: Vec<_> = orders
            .iter()
            .map(|o| (o.order_number.as_str(), o.amount))
            .collect();
        assert!(amounts.contains(&("ORD-2024-001", Price::from_units(89_000))));
        assert!(amounts.contains(&("ORD-2024-002", Price::from_units(125_000))));
        assert!(amounts.contains(&("ORD-2024-003", Price::from_units(67_000))));

        let summary = repos.orders.summary().await.unwrap();
        assert_eq!(summary.new_orders, 1);
        assert_eq!(summary.total_revenue, Price::from_units(281_000));
    }

    #[tokio::test]
    async fn test_catalog_seed_can_be_disabled() {
        let (repos, hasher, mut config) = setup();
        config.seed_catalog = false;

        let report = run(&repos, &hasher, &config).await.unwrap();
        assert!(report.admin_created);
        assert!(
            repos
                .products
                .list(ProductFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
