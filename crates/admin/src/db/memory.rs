//! In-memory repository backend.
//!
//! Each store owns its collection behind a `tokio::sync::RwLock`. Ids are
//! assigned sequentially from 1. Nothing survives a restart.

use std::cmp::Reverse;
use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use signal_living_core::{
    ActivityLogId, AdminRole, AdminUserId, OrderId, OrderStatus, ProductId,
};

use super::{ActivityLogStore, AdminUserStore, OrderStore, ProductStore, RepositoryError};
use crate::models::{
    ActivityLog, ActivityLogPage, ActivityLogQuery, ActivityStats, AdminCredentials, AdminUser,
    AdminUserChanges, NewActivityLog, NewAdminUser, NewOrder, Order, OrderSummary, Product,
    ProductDraft, ProductFilter, StatsWindow,
};

/// Rows keyed by sequential id.
struct Table<T> {
    last_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    const fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn index(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

// =============================================================================
// Admin users
// =============================================================================

/// In-memory admin accounts (account plus stored hash).
#[derive(Default)]
pub struct MemoryAdminUsers {
    table: RwLock<Table<AdminCredentials>>,
}

/// `id` is a `super_admin` and no other account is.
fn is_last_super_admin(table: &Table<AdminCredentials>, id: AdminUserId) -> bool {
    let is_super = |c: &AdminCredentials| c.user.role == AdminRole::SuperAdmin;
    table.rows.get(&id.as_i32()).is_some_and(is_super)
        && table.rows.values().filter(|c| is_super(c)).count() <= 1
}

#[async_trait]
impl AdminUserStore for MemoryAdminUsers {
    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let table = self.table.read().await;
        let mut users: Vec<AdminUser> = table.rows.values().map(|c| c.user.clone()).collect();
        users.sort_by_key(|u| Reverse((u.created_at, u.id.as_i32())));
        Ok(users)
    }

    async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id.as_i32()).map(|c| c.user.clone()))
    }

    async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|c| c.user.username.as_str() == username)
            .cloned())
    }

    async fn create(&self, new: NewAdminUser) -> Result<AdminUser, RepositoryError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|c| c.user.username == new.username) {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }

        let id = table.next_id();
        let user = AdminUser {
            id: AdminUserId::new(id),
            username: new.username,
            role: new.role,
            last_login: None,
            created_at: Utc::now(),
        };
        table.rows.insert(
            id,
            AdminCredentials {
                user: user.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(user)
    }

    async fn update(
        &self,
        id: AdminUserId,
        changes: AdminUserChanges,
    ) -> Result<AdminUser, RepositoryError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id.as_i32()) {
            return Err(RepositoryError::NotFound);
        }

        if let Some(username) = &changes.username
            && table
                .rows
                .iter()
                .any(|(other, c)| *other != id.as_i32() && &c.user.username == username)
        {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }

        if changes.role.is_some_and(|role| role != AdminRole::SuperAdmin)
            && is_last_super_admin(&table, id)
        {
            return Err(RepositoryError::LastSuperAdmin);
        }

        let row = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        if let Some(username) = changes.username {
            row.user.username = username;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        if let Some(role) = changes.role {
            row.user.role = role;
        }
        Ok(row.user.clone())
    }

    async fn delete(&self, id: AdminUserId) -> Result<AdminUser, RepositoryError> {
        let mut table = self.table.write().await;
        if is_last_super_admin(&table, id) {
            return Err(RepositoryError::LastSuperAdmin);
        }
        table
            .rows
            .remove(&id.as_i32())
            .map(|c| c.user)
            .ok_or(RepositoryError::NotFound)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(count(self.table.read().await.rows.len()))
    }

    async fn count_by_role(&self, role: AdminRole) -> Result<u64, RepositoryError> {
        let table = self.table.read().await;
        Ok(count(
            table.rows.values().filter(|c| c.user.role == role).count(),
        ))
    }

    async fn record_login(
        &self,
        id: AdminUserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        row.user.last_login = Some(at);
        Ok(())
    }
}

// =============================================================================
// Products
// =============================================================================

/// In-memory catalog.
#[derive(Default)]
pub struct MemoryProducts {
    table: RwLock<Table<Product>>,
}

#[async_trait]
impl ProductStore for MemoryProducts {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let table = self.table.read().await;
        let mut products: Vec<Product> = table
            .rows
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by_key(|p| Reverse((p.created_at, p.id.as_i32())));
        Ok(products)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let mut table = self.table.write().await;
        let id = table.next_id();
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(id),
            name: draft.name,
            category: draft.category,
            price: draft.price,
            stock: draft.stock,
            status: draft.status,
            description: draft.description,
            image_url: draft.image_url,
            is_new_product: draft.is_new_product,
            is_best: draft.is_best,
            discount: draft.discount,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let mut table = self.table.write().await;
        let product = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;

        product.name = draft.name;
        product.category = draft.category;
        product.price = draft.price;
        product.stock = draft.stock;
        product.status = draft.status;
        product.description = draft.description;
        product.image_url = draft.image_url;
        product.is_new_product = draft.is_new_product;
        product.is_best = draft.is_best;
        product.discount = draft.discount;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id.as_i32())
            .ok_or(RepositoryError::NotFound)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(count(self.table.read().await.rows.len()))
    }
}

// =============================================================================
// Orders
// =============================================================================

/// In-memory orders.
#[derive(Default)]
pub struct MemoryOrders {
    table: RwLock<Table<Order>>,
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let table = self.table.read().await;
        let mut orders: Vec<Order> = table.rows.values().cloned().collect();
        orders.sort_by_key(|o| Reverse((o.created_at, o.id.as_i32())));
        Ok(orders)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn create(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|o| o.order_number == new.order_number)
        {
            return Err(RepositoryError::Conflict(
                "order number already exists".to_owned(),
            ));
        }

        let id = table.next_id();
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(id),
            order_number: new.order_number,
            customer: new.customer,
            amount: new.amount,
            status: new.status,
            date: new.date,
            items: new.items,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, order.clone());
        Ok(order)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(Order, OrderStatus), RepositoryError> {
        let mut table = self.table.write().await;
        let order = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;

        let previous = order.status;
        order.status = status;
        order.updated_at = Utc::now();
        Ok((order.clone(), previous))
    }

    async fn summary(&self) -> Result<OrderSummary, RepositoryError> {
        let table = self.table.read().await;
        Ok(OrderSummary::from_orders(table.rows.values()))
    }
}

// =============================================================================
// Activity log
// =============================================================================

struct Ring {
    last_id: i32,
    capacity: usize,
    entries: VecDeque<ActivityLog>,
}

/// Bounded in-memory audit trail.
///
/// Keeps the most recent `capacity` entries; the oldest entry is dropped on
/// overflow. Ids keep increasing across evictions.
pub struct MemoryActivityLog {
    ring: RwLock<Ring>,
}

impl MemoryActivityLog {
    /// Create a log holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: RwLock::new(Ring {
                last_id: 0,
                capacity,
                entries: VecDeque::with_capacity(capacity),
            }),
        }
    }

    /// Entries sorted newest first.
    fn newest_first<'a>(entries: impl Iterator<Item = &'a ActivityLog>) -> Vec<&'a ActivityLog> {
        let mut sorted: Vec<&ActivityLog> = entries.collect();
        sorted.sort_by_key(|e| Reverse((e.timestamp, e.id.as_i32())));
        sorted
    }
}

#[async_trait]
impl ActivityLogStore for MemoryActivityLog {
    async fn append(&self, entry: NewActivityLog) -> Result<ActivityLog, RepositoryError> {
        let mut ring = self.ring.write().await;
        ring.last_id += 1;
        let log = entry.with_id(ActivityLogId::new(ring.last_id));

        ring.entries.push_back(log.clone());
        while ring.entries.len() > ring.capacity {
            ring.entries.pop_front();
        }
        Ok(log)
    }

    async fn query(&self, query: &ActivityLogQuery) -> Result<ActivityLogPage, RepositoryError> {
        let ring = self.ring.read().await;
        let matching = Self::newest_first(ring.entries.iter().filter(|e| query.matches(e)));

        let total = count(matching.len());
        let entries = matching
            .into_iter()
            .skip(index(query.offset()))
            .take(index(u64::from(query.limit)))
            .cloned()
            .collect();
        Ok(ActivityLogPage::new(entries, total, query))
    }

    async fn stats(&self, window: StatsWindow) -> Result<ActivityStats, RepositoryError> {
        let ring = self.ring.read().await;
        Ok(ActivityStats::tally(ring.entries.iter(), window))
    }

    async fn recent_by_admin(
        &self,
        admin_id: AdminUserId,
        limit: u32,
    ) -> Result<Vec<ActivityLog>, RepositoryError> {
        let ring = self.ring.read().await;
        Ok(
            Self::newest_first(ring.entries.iter().filter(|e| e.admin_id == Some(admin_id)))
                .into_iter()
                .take(index(u64::from(limit)))
                .cloned()
                .collect(),
        )
    }
}
